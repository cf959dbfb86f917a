//! This is an internal module that contains utility functionality used by other modules.

/// Run `$op` for as long as `$cond` holds, returning `Err($err)` from the enclosing function
/// once `MAX_ITERS` passes have gone by without the condition clearing.
///
/// Example: `bounded_loop!(value == from, Error::RegisterUnchanged, { value = read() });`
macro_rules! bounded_loop {
    ($cond:expr, $err:expr, $op:block) => {
        let mut i: u32 = 0;
        while $cond {
            $op
            i += 1;
            if i >= crate::MAX_ITERS {
                warn!("bounded loop gave up after {} iterations", i);
                return Err($err.into());
            }
        }
    };
}

pub(crate) use bounded_loop;
