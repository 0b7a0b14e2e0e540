//! Array subscript resolution.
//!
//! Converts the textual body of an array subscript (`1`, `1:5:2`, `*`,
//! `0,2,4`, ...) plus the length of the target sequence into the concrete
//! list of indices to select, in walk order. The lexer also runs the
//! resolver with a length of zero to reject malformed subscripts at
//! compile time, so evaluation-time resolution cannot fail on a subscript
//! the lexer accepted.

use std::num::IntErrorKind;

/// Resolves a subscript body against a sequence of `length` elements.
///
/// Every returned index is in `0..length`. Slice bounds clamp to the
/// sequence limits; a single out-of-range index selects nothing.
pub(crate) fn slice(index: &str, length: usize) -> Result<Vec<usize>, String> {
    let members: Vec<&str> = index.split(',').collect();
    if members.len() > 1 {
        let mut combination = Vec::new();
        for (i, member) in members.iter().enumerate() {
            if member.trim() == "*" {
                return Err("wildcard cannot be used in union".to_string());
            }
            let indices =
                slice(member, length).map_err(|e| format!("error in union member {}: {}", i, e))?;
            combination.extend(indices);
        }
        return Ok(combination);
    }

    let index = index.trim();
    if index.is_empty() {
        return Err("array index missing".to_string());
    }
    if index == "*" {
        return Ok((0..length).collect());
    }
    let n = length as i64;

    let parts: Vec<&str> = index.split(':').collect();
    if parts.len() > 3 {
        return Err("malformed array index, too many colons".to_string());
    }

    if parts.len() == 1 {
        let i = parse_bound(parts[0])?;
        let i = if i < 0 { i.saturating_add(n) } else { i };
        if i < 0 || i >= n {
            return Ok(Vec::new());
        }
        return Ok(vec![i as usize]);
    }

    let step = match parts.get(2).map(|s| s.trim()) {
        None | Some("") => 1,
        Some(s) => {
            let step = parse_bound(s)?;
            if step == 0 {
                return Err("array index step value must be non-zero".to_string());
            }
            step
        }
    };

    // blank bounds depend on the walk direction: forwards runs 0..n,
    // backwards runs n-1 down to one before index 0
    let mut from = match parts[0].trim() {
        "" => {
            if step > 0 {
                0
            } else {
                n - 1
            }
        }
        s => parse_bound(s)?,
    };
    let mut to = match parts[1].trim() {
        "" => {
            if step > 0 {
                n
            } else {
                -n - 1
            }
        }
        s => parse_bound(s)?,
    };
    if from < 0 {
        from = from.saturating_add(n);
    }
    if to < 0 {
        to = to.saturating_add(n);
    }
    if step > 0 {
        from = from.max(0);
        to = to.min(n);
    } else {
        from = from.min(n - 1);
        to = to.max(-1);
    }

    let mut indices = Vec::new();
    let mut i = from;
    if step > 0 {
        while i < to {
            indices.push(i as usize);
            i = match i.checked_add(step) {
                Some(next) => next,
                None => break,
            };
        }
    } else {
        while i > to {
            indices.push(i as usize);
            i = match i.checked_add(step) {
                Some(next) => next,
                None => break,
            };
        }
    }
    Ok(indices)
}

/// Parses a subscript component, saturating values beyond the machine
/// integer range so they clamp to the sequence limits later.
fn parse_bound(s: &str) -> Result<i64, String> {
    match s.trim().parse::<i64>() {
        Ok(value) => Ok(value),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => Ok(i64::MAX),
            IntErrorKind::NegOverflow => Ok(i64::MIN),
            _ => Err("non-integer array index".to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_index() {
        assert_eq!(slice("3", 10).unwrap(), vec![3]);
    }

    #[test]
    fn test_negative_index() {
        assert_eq!(slice("-1", 4).unwrap(), vec![3]);
    }

    #[test]
    fn test_index_out_of_range() {
        assert_eq!(slice("4", 4).unwrap(), Vec::<usize>::new());
        assert_eq!(slice("-5", 4).unwrap(), Vec::<usize>::new());
    }

    #[test]
    fn test_range() {
        assert_eq!(slice("1:3", 10).unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_range_with_step() {
        assert_eq!(slice("1:6:2", 10).unwrap(), vec![1, 3, 5]);
    }

    #[test]
    fn test_wildcard() {
        assert_eq!(slice("*", 4).unwrap(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_range_everything_omitted() {
        assert_eq!(slice(":", 4).unwrap(), vec![0, 1, 2, 3]);
        assert_eq!(slice("::", 4).unwrap(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_range_start_omitted() {
        assert_eq!(slice(":2", 10).unwrap(), vec![0, 1]);
    }

    #[test]
    fn test_range_start_and_end_omitted_with_step() {
        assert_eq!(slice("::2", 10).unwrap(), vec![0, 2, 4, 6, 8]);
    }

    #[test]
    fn test_negative_step_defaults() {
        assert_eq!(slice("::-1", 4).unwrap(), vec![3, 2, 1, 0]);
        assert_eq!(slice(":0:-1", 4).unwrap(), vec![3, 2, 1]);
        assert_eq!(slice("2::-1", 4).unwrap(), vec![2, 1, 0]);
    }

    #[test]
    fn test_negative_bounds_in_range() {
        assert_eq!(slice("-2:", 4).unwrap(), vec![2, 3]);
        assert_eq!(slice(":-1", 4).unwrap(), vec![0, 1, 2]);
        assert_eq!(slice("-1:-3:-1", 4).unwrap(), vec![3, 2]);
    }

    #[test]
    fn test_bounds_clamp_to_sequence_limits() {
        assert_eq!(slice("-10:100", 4).unwrap(), vec![0, 1, 2, 3]);
        assert_eq!(slice("100:-100:-1", 4).unwrap(), vec![3, 2, 1, 0]);
    }

    #[test]
    fn test_overflowing_bounds_saturate_then_clamp() {
        assert_eq!(
            slice("0:99999999999999999999999", 3).unwrap(),
            vec![0, 1, 2]
        );
        assert_eq!(
            slice("-99999999999999999999999:2", 3).unwrap(),
            vec![0, 1]
        );
    }

    #[test]
    fn test_empty_range() {
        assert_eq!(slice("3:1", 10).unwrap(), Vec::<usize>::new());
        assert_eq!(slice("1:3:-1", 10).unwrap(), Vec::<usize>::new());
    }

    #[test]
    fn test_union() {
        assert_eq!(slice("0,2,4", 10).unwrap(), vec![0, 2, 4]);
    }

    #[test]
    fn test_union_preserves_duplicates_and_order() {
        assert_eq!(slice("2,0,2", 10).unwrap(), vec![2, 0, 2]);
    }

    #[test]
    fn test_union_of_ranges() {
        assert_eq!(slice("0:2,3:5", 10).unwrap(), vec![0, 1, 3, 4]);
    }

    #[test]
    fn test_union_with_whitespace() {
        assert_eq!(slice(" 1 , 2 ", 10).unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_empty_index_fails() {
        assert_eq!(slice("", 10).unwrap_err(), "array index missing");
        assert_eq!(slice("  ", 10).unwrap_err(), "array index missing");
    }

    #[test]
    fn test_too_many_colons_fails() {
        assert_eq!(
            slice("1:2:3:4", 10).unwrap_err(),
            "malformed array index, too many colons"
        );
    }

    #[test]
    fn test_non_integer_fails() {
        assert_eq!(slice("x", 10).unwrap_err(), "non-integer array index");
        assert_eq!(slice("1:x", 10).unwrap_err(), "non-integer array index");
    }

    #[test]
    fn test_zero_step_fails() {
        assert_eq!(
            slice("1:5:0", 10).unwrap_err(),
            "array index step value must be non-zero"
        );
    }

    #[test]
    fn test_wildcard_in_union_fails() {
        assert_eq!(
            slice("0,*", 10).unwrap_err(),
            "wildcard cannot be used in union"
        );
    }

    #[test]
    fn test_union_member_error_is_wrapped() {
        assert_eq!(
            slice("0,x", 10).unwrap_err(),
            "error in union member 1: non-integer array index"
        );
    }

    #[test]
    fn test_validation_with_zero_length() {
        // the lexer validates subscripts against a zero-length sequence
        assert_eq!(slice("3", 0).unwrap(), Vec::<usize>::new());
        assert_eq!(slice("1:5:2", 0).unwrap(), Vec::<usize>::new());
        assert!(slice("1:5:0", 0).is_err());
    }

    #[test]
    fn test_reversed_slice_yields_reversed_indices() {
        let forward = slice("1:4", 5).unwrap();
        let mut backward = slice("3:0:-1", 5).unwrap();
        backward.reverse();
        assert_eq!(forward, backward);
    }
}
