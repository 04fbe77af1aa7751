use crate::Real;
use numeric_literals::replace_float_literals;

/// Approximates the derivative of `f` with respect to a single scalar entry of `state`
/// with a central finite difference of step size `h`.
///
/// The entry is accessed through `read` and `write`. It is perturbed to $x + h$ and $x - h$
/// in turn, and is always restored to its initial value before returning, including when
/// `f` fails. If the evaluation at $x + h$ fails, $x - h$ is never evaluated.
#[replace_float_literals(T::from_f64(literal).unwrap())]
pub fn try_central_difference<S, T, E>(
    state: &mut S,
    read: impl Fn(&S) -> T,
    mut write: impl FnMut(&mut S, T),
    mut f: impl FnMut(&S) -> Result<T, E>,
    h: T,
) -> Result<T, E>
where
    S: ?Sized,
    T: Real,
{
    let x = read(state);
    write(state, x + h);
    let result = f(state).and_then(|f_plus| {
        write(state, x - h);
        f(state).map(|f_minus| (f_plus - f_minus) / (2.0 * h))
    });
    write(state, x);
    result
}
