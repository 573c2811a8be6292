use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use task_barrier::{InvalidState, Pending, TaskBarrier};

#[test]
fn every_waiter_released_once() {
    for n in [0u32, 1, 2, 7, 32] {
        let barrier = TaskBarrier::new(n);
        let released = AtomicUsize::new(0);
        thread::scope(|s| {
            for _ in 0..3 {
                s.spawn(|| {
                    barrier.wait();
                    released.fetch_add(1, Ordering::SeqCst);
                });
            }
            for _ in 0..n {
                s.spawn(|| barrier.signal_done().unwrap());
            }
        });
        assert_eq!(3, released.load(Ordering::SeqCst), "n = {}", n);
        assert!(barrier.is_satisfied());
    }
}

#[test]
fn many_signallers_one_waiter_terminates() {
    const K: u32 = 64;
    for _ in 0..20 {
        let barrier = Arc::new(TaskBarrier::new(K));
        let workers: Vec<_> = (0..K)
            .map(|_| {
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || barrier.signal_done())
            })
            .collect();
        barrier.wait();
        for w in workers {
            assert_eq!(Ok(()), w.join().unwrap());
        }
        assert_eq!(0, barrier.count());
    }
}

#[test]
fn one_too_many_signals() {
    let barrier = TaskBarrier::new(1);
    barrier.signal_done().unwrap();
    assert_eq!(Err(InvalidState::ExcessDone), barrier.signal_done());
}

#[test]
fn extra_signals_under_contention() {
    const N: usize = 8;
    let barrier = TaskBarrier::new(N as u32);
    let failures = AtomicUsize::new(0);
    thread::scope(|s| {
        for _ in 0..N * 2 {
            s.spawn(|| {
                if barrier.signal_done().is_err() {
                    failures.fetch_add(1, Ordering::SeqCst);
                }
            });
        }
    });
    assert_eq!(N, failures.load(Ordering::SeqCst));
    barrier.wait();
}

#[test]
fn workers_finish_before_main_continues() {
    let barrier = Arc::new(TaskBarrier::new(2));
    let out = Arc::new(Mutex::new(Vec::new()));
    for msg in ["Hello", "World"] {
        let pending = Pending::new(Arc::clone(&barrier));
        let out = Arc::clone(&out);
        thread::spawn(move || {
            let _pending = pending;
            for _ in 0..3 {
                out.lock().unwrap().push(msg);
                thread::sleep(Duration::from_millis(10));
            }
        });
    }
    barrier.wait();
    out.lock().unwrap().push("finished");

    let out = out.lock().unwrap();
    assert_eq!(7, out.len());
    assert_eq!(Some(&"finished"), out.last());
    assert_eq!(3, out.iter().filter(|m| **m == "Hello").count());
    assert_eq!(3, out.iter().filter(|m| **m == "World").count());
}

#[test]
fn registered_tasks_with_a_panic() {
    let barrier = TaskBarrier::new(0);
    thread::scope(|s| {
        let tasks: Vec<_> = (0..4)
            .map(|i| {
                let pending = barrier.register().unwrap();
                s.spawn(move || {
                    let _pending = pending;
                    if i == 2 { panic!("task {} failed", i) }
                })
            })
            .collect();
        barrier.wait();
        assert_eq!(Err(InvalidState::Satisfied), barrier.add(1));
        let failed = tasks.into_iter().map(|t| t.join()).filter(Result::is_err).count();
        assert_eq!(1, failed);
    });
}

#[test]
fn blocked_waiters_survive_rearm_attempt() {
    for _ in 0..20 {
        let barrier = TaskBarrier::new(1);
        let released = AtomicUsize::new(0);
        thread::scope(|s| {
            for _ in 0..3 {
                s.spawn(|| {
                    barrier.wait();
                    released.fetch_add(1, Ordering::SeqCst);
                });
            }
            while barrier.waiters() < 3 { thread::yield_now() }
            barrier.signal_done().unwrap();
            assert_eq!(Err(InvalidState::Satisfied), barrier.add(1));
        });
        assert_eq!(3, released.load(Ordering::SeqCst));
        assert_eq!(0, barrier.count());
    }
}
