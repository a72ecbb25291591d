use anyhow::{Result, bail};
use std::{fmt::Debug, ops::RangeBounds};

/// Check that `num` lies in `range`.
///
/// NaN is never contained in any range, so this also rejects NaN values.
pub fn check_num<T, R>(num: T, range: R) -> Result<()>
where
    T: PartialOrd + Debug,
    R: RangeBounds<T> + Debug,
{
    if !range.contains(&num) {
        bail!("number must be in the range {range:?}, but is {num:?}");
    }
    Ok(())
}
