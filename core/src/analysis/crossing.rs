/// Index `k` of the first pair `(k, k + 1)` whose sign bits differ.
///
/// Sign bits are compared, not signs: `0.0` counts as positive and `-0.0` as
/// negative. The returned index is the sample before the change.
pub fn first_sign_change<I>(values: I) -> Option<usize>
where
    I: IntoIterator<Item = f64>,
{
    let mut iter = values.into_iter();
    let mut previous = iter.next()?.is_sign_negative();
    for (idx, value) in iter.enumerate() {
        let negative = value.is_sign_negative();
        if negative != previous {
            return Some(idx);
        }
        previous = negative;
    }
    None
}
