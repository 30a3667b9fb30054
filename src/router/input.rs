/*
 *   Copyright (c) 2024 R3BL LLC
 *   All rights reserved.
 *
 *   Licensed under the Apache License, Version 2.0 (the "License");
 *   you may not use this file except in compliance with the License.
 *   You may obtain a copy of the License at
 *
 *   http://www.apache.org/licenses/LICENSE-2.0
 *
 *   Unless required by applicable law or agreed to in writing, software
 *   distributed under the License is distributed on an "AS IS" BASIS,
 *   WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 *   See the License for the specific language governing permissions and
 *   limitations under the License.
 */

//! The view a matched [`crate::router::unit::Unit`] sees of the dispatched
//! command line (§4.E).

use crate::error::RouterError;

/// A matched command line, with 0-indexed access to the pattern's capture
/// groups (group 0, the whole match, is excluded).
#[derive(Debug, Clone)]
pub struct Input {
    raw: String,
    sub_matches: Vec<String>,
    unit_name: String,
}

impl Input {
    pub(crate) fn new(raw: String, sub_matches: Vec<String>, unit_name: String) -> Self {
        Input {
            raw,
            sub_matches,
            unit_name,
        }
    }

    pub fn get_segment(&self, index: usize) -> Result<&str, RouterError> {
        self.sub_matches
            .get(index)
            .map(String::as_str)
            .ok_or(RouterError::SegmentOutOfRange(index))
    }

    pub fn segment_exists(&self, index: usize) -> bool {
        self.sub_matches.get(index).is_some_and(|s| !s.is_empty())
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn name(&self) -> &str {
        &self.unit_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_access_is_zero_indexed_and_excludes_group_zero() {
        let input = Input::new(
            "set state up 5".to_string(),
            vec!["up".to_string(), "5".to_string()],
            "set_state".to_string(),
        );
        assert_eq!(input.get_segment(0).unwrap(), "up");
        assert_eq!(input.get_segment(1).unwrap(), "5");
        assert!(input.get_segment(2).is_err());
        assert!(input.segment_exists(0));
    }

    #[test]
    fn empty_capture_reports_not_existing() {
        let input = Input::new("x".to_string(), vec![String::new()], "u".to_string());
        assert!(!input.segment_exists(0));
    }
}
