use super::intervals::Interval;

/// Bisection on a function that may fail to evaluate.
///
/// `interval` must bracket a sign change of `f`. The bracket is halved until
/// it is narrower than `convergence`, until it can't be split any further, or
/// until `num_iterations` runs out, and the final bracket is returned. Callers
/// that need to be past the root should use its upper end.
#[allow(clippy::float_cmp)]
pub fn bisection<E>(
    mut f: impl FnMut(f64) -> Result<f64, E>,
    mut interval: Interval,
    convergence: f64,
    num_iterations: usize,
) -> Result<Interval, E> {
    // We need to determine which way f is oriented in our interval.
    let lo_is_neg = f(interval.lo())? < 0.0;

    for _ in 0..num_iterations {
        if interval.width() <= convergence {
            break;
        }

        // Check right in the middle of the interval
        let guess = interval.midpoint();

        // If the interval is too small, we've converged.
        if guess == interval.lo() || guess == interval.hi() {
            break;
        }

        // Check the value and update the interval
        let value = f(guess)?;
        interval = match (lo_is_neg, value < 0.0) {
            (true, true) => interval.split_right(guess),   // - - +
            (true, false) => interval.split_left(guess),   // - + +
            (false, true) => interval.split_left(guess),   // + - -
            (false, false) => interval.split_right(guess), // + + -
        }
    }

    Ok(interval)
}
