//! Example: Round-robin scheduling of fibers from a thread fiber

use filament::{Fiber, InlineVec};
use std::io;
use std::sync::{Arc, Mutex};

const STACK_SIZE: usize = 64 * 1024;
const WORKERS: usize = 3;
const STEPS: usize = 4;

fn main() -> io::Result<()> {
    // Adopt this thread so the workers have a scheduler to yield back to.
    let scheduler = Fiber::from_current_thread()?;

    let finished = Arc::new(Mutex::new([false; WORKERS]));

    // The run queue lives inline; three workers never touch the heap.
    let mut workers: InlineVec<Arc<Fiber>, 8> = InlineVec::new();
    for id in 0..WORKERS {
        let back = Arc::clone(&scheduler);
        let finished = Arc::clone(&finished);
        workers.push(Fiber::new(STACK_SIZE, move |me| {
            for step in 0..STEPS {
                println!("worker {id} step {step}");
                // Yield: suspend here and hand control to the scheduler.
                unsafe { me.switch_to(&back) };
            }

            finished.lock().unwrap()[id] = true;
            println!("worker {id} finished");
            unsafe { me.switch_to(&back) };
        })?);
    }

    // Resume each unfinished worker in turn until all are done.
    let mut rounds = 0;
    loop {
        let pending: Vec<usize> = {
            let finished = finished.lock().unwrap();
            (0..WORKERS).filter(|&id| !finished[id]).collect()
        };
        if pending.is_empty() {
            break;
        }

        rounds += 1;
        for id in pending {
            unsafe { scheduler.switch_to(&workers[id]) };
        }
    }

    println!("all workers finished after {rounds} rounds");
    Ok(())
}
