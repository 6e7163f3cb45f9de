// Netweave
// Copyright (C) 2025 Netweave EDA

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Channel specification parser
//!
//! Channel specs come from user input and take three forms: a single number
//! ("4"), an inclusive range ("2-8" or "2:8"), or an explicit list
//! ("1,3,5" or "1;3;5"). List separators win over range separators, so a
//! mixed spec like "1-3,5" is rejected rather than partially expanded.

use crate::g2g::error::{G2gError, G2gResult};

/// Hard cap on channels produced by a single spec
pub const MAX_CHANNELS: usize = 30;

/// Parse a channel spec into the ordered list of channel numbers it names
pub fn parse_channel_range(spec: &str) -> G2gResult<Vec<u32>> {
    let spec = spec.trim();
    if spec.is_empty() {
        return Err(G2gError::validation("Channel spec is empty"));
    }

    let channels = if spec.contains([',', ';']) {
        parse_list(spec)?
    } else if spec.contains(['-', ':']) {
        parse_range(spec)?
    } else {
        vec![parse_number(spec)?]
    };

    if channels.len() > MAX_CHANNELS {
        return Err(over_cap_error(spec, channels.len() as u64));
    }

    Ok(channels)
}

fn parse_list(spec: &str) -> G2gResult<Vec<u32>> {
    spec.split([',', ';']).map(|entry| parse_number(entry.trim())).collect()
}

fn parse_range(spec: &str) -> G2gResult<Vec<u32>> {
    let parts: Vec<&str> = spec.split(['-', ':']).collect();
    if parts.len() != 2 {
        return Err(G2gError::validation(format!("Channel range '{}' must have exactly one separator", spec)));
    }

    let low = parse_number(parts[0].trim())?;
    let high = parse_number(parts[1].trim())?;
    if low >= high {
        return Err(G2gError::validation(format!("Channel range '{}' must run from a lower to a higher number", spec)));
    }

    // Cap check on the arithmetic span, never on an expanded vector; u64 keeps the count exact for 0..=u32::MAX
    let count = u64::from(high) - u64::from(low) + 1;
    if count > MAX_CHANNELS as u64 {
        return Err(over_cap_error(spec, count));
    }

    Ok((low..=high).collect())
}

fn parse_number(entry: &str) -> G2gResult<u32> {
    if entry.is_empty() {
        return Err(G2gError::validation("Channel spec contains an empty entry"));
    }
    entry
        .parse::<u32>()
        .map_err(|_| G2gError::validation(format!("Channel entry '{}' is not a number", entry)))
}

fn over_cap_error(spec: &str, count: u64) -> G2gError {
    G2gError::validation(format!(
        "Channel spec '{}' produces {} channels, more than the maximum of {}",
        spec, count, MAX_CHANNELS
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_single_channel() {
        assert_eq!(parse_channel_range("4").unwrap(), vec![4]);
        assert_eq!(parse_channel_range(" 12 ").unwrap(), vec![12]);
    }

    #[test]
    fn test_dash_and_colon_ranges_are_inclusive() {
        assert_eq!(parse_channel_range("2-8").unwrap(), vec![2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(parse_channel_range("2:8").unwrap(), vec![2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_list_separators() {
        assert_eq!(parse_channel_range("1,3,5").unwrap(), vec![1, 3, 5]);
        assert_eq!(parse_channel_range("1; 3 ;5").unwrap(), vec![1, 3, 5]);
    }

    #[test]
    fn test_list_keeps_order_and_duplicates() {
        assert_eq!(parse_channel_range("5,1,5").unwrap(), vec![5, 1, 5]);
    }

    #[test]
    fn test_mixed_spec_rejected() {
        // Lists win, so "1-3" becomes a malformed list entry
        let err = parse_channel_range("1-3,5").unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_inverted_and_degenerate_ranges_rejected() {
        assert!(parse_channel_range("8-2").unwrap_err().is_validation());
        assert!(parse_channel_range("4-4").unwrap_err().is_validation());
    }

    #[test]
    fn test_empty_and_garbage_rejected() {
        assert!(parse_channel_range("").unwrap_err().is_validation());
        assert!(parse_channel_range("  ").unwrap_err().is_validation());
        assert!(parse_channel_range("abc").unwrap_err().is_validation());
        assert!(parse_channel_range("1,,2").unwrap_err().is_validation());
        assert!(parse_channel_range("1-2-3").unwrap_err().is_validation());
    }

    #[test]
    fn test_channel_cap() {
        assert_eq!(parse_channel_range("1-30").unwrap().len(), 30);
        let err = parse_channel_range("1-31").unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("maximum"));
    }

    #[test]
    fn test_oversized_range_rejected_without_expansion() {
        let err = parse_channel_range("1-4000000000").unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("4000000000 channels"));

        // Full u32 span; the count itself only fits in u64
        let err = parse_channel_range("0-4294967295").unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("4294967296 channels"));
    }

    // Mix of arbitrary junk and well-formed ranges landing on both sides of the cap
    fn spec_strategy() -> impl Strategy<Value = String> {
        prop_oneof![
            ".{0,40}",
            (0u32..1000, 0u32..100).prop_map(|(lo, span)| format!("{}-{}", lo, lo + span)),
        ]
    }

    proptest! {
        #[test]
        fn prop_parser_never_panics_and_honors_cap(spec in spec_strategy()) {
            if let Ok(channels) = parse_channel_range(&spec) {
                prop_assert!(!channels.is_empty());
                prop_assert!(channels.len() <= MAX_CHANNELS);
            }
        }

        #[test]
        fn prop_ranges_expand_inclusively_up_to_the_cap(lo in 0u32..1000, span in 0u32..100) {
            let spec = format!("{}-{}", lo, lo + span);
            match parse_channel_range(&spec) {
                Ok(channels) => {
                    prop_assert!(span >= 1 && (span as usize) < MAX_CHANNELS);
                    prop_assert_eq!(channels.len(), (span + 1) as usize);
                    prop_assert_eq!(channels[0], lo);
                    prop_assert_eq!(*channels.last().unwrap(), lo + span);
                }
                Err(err) => {
                    prop_assert!(err.is_validation());
                    prop_assert!(span == 0 || (span as usize) >= MAX_CHANNELS);
                }
            }
        }
    }
}
