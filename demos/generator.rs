//! Example: A fiber as a resumable generator

use filament::{Fiber, InlineVec};
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

const STACK_SIZE: usize = 64 * 1024;

fn main() -> io::Result<()> {
    let main = Fiber::from_current_thread()?;

    // One value travels per switch; the generator fills the slot, the
    // consumer drains it.
    let slot = Arc::new(AtomicU64::new(0));

    let out = Arc::clone(&slot);
    let back = Arc::clone(&main);
    let generator = Fiber::new(STACK_SIZE, move |me| {
        let (mut a, mut b) = (0u64, 1u64);
        loop {
            out.store(a, Ordering::Release);
            (a, b) = (b, a + b);
            // Suspend until the consumer asks for the next value.
            unsafe { me.switch_to(&back) };
        }
    })?;

    // The fiber's locals survive every suspension, so the sequence picks up
    // exactly where it left off.
    let mut values: InlineVec<u64, 16> = InlineVec::new();
    for _ in 0..16 {
        unsafe { main.switch_to(&generator) };
        values.push(slot.load(Ordering::Acquire));
    }

    println!("first {} fibonacci numbers: {values:?}", values.len());
    Ok(())
}
