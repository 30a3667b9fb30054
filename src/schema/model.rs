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

//! Schema data model (§3, §4.C): commands, params and their ranges, as
//! deserialized from a JSON schema document.

use serde::{de, Deserialize, Deserializer};
use strum_macros::{Display, EnumString};

/// One `what to type / help text` pair, surfaced by the help renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpEntry {
    pub what_to_input: String,
    pub info: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum ParamType {
    #[strum(serialize = "SELECTION")]
    Selection,
    #[strum(serialize = "PLAIN")]
    Plain,
}

impl<'de> Deserialize<'de> for ParamType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.trim()
            .to_uppercase()
            .parse::<ParamType>()
            .map_err(|_| de::Error::custom(format!("invalid param type: |{raw}|")))
    }
}

/// A `"name"` field that packs an optional description after a colon, e.g.
/// `"state: interface admin/oper state"`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamNameDesc {
    pub name: String,
    pub desc: String,
}

impl<'de> Deserialize<'de> for ParamNameDesc {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        let trimmed = raw.trim();
        let mut parts = trimmed.splitn(2, ':');
        let name = parts.next().unwrap_or("").trim().to_string();
        let desc = parts.next().unwrap_or("").trim().to_string();
        Ok(ParamNameDesc { name, desc })
    }
}

/// The `"range"` field of a SELECTION param: either a single string or a
/// list of strings, each optionally of the form `"value: description"`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ParamRange {
    Single(String),
    List(Vec<String>),
}

impl ParamRange {
    fn entries(&self) -> Vec<String> {
        match self {
            ParamRange::Single(s) => vec![s.clone()],
            ParamRange::List(v) => v.clone(),
        }
    }

    /// Decode into parallel `(names, descriptions)` vectors.
    pub fn decode_selection(&self) -> (Vec<String>, Vec<String>) {
        let mut names = Vec::new();
        let mut descs = Vec::new();

        for raw in self.entries() {
            let s = raw.trim();
            let mut parts = s.splitn(2, ':');
            let first = parts.next().unwrap_or("").trim().to_string();
            match parts.next() {
                Some(d) => {
                    names.push(first);
                    descs.push(d.trim().to_string());
                }
                None => {
                    names.push(first);
                    descs.push(String::new());
                }
            }
        }

        (names, descs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParamDef {
    #[serde(rename = "name")]
    pub name_desc: ParamNameDesc,
    #[serde(rename = "type")]
    pub param_type: ParamType,
    #[serde(default)]
    pub range: Option<ParamRange>,
    /// Advisory only: never consulted by the completion/router engine,
    /// just rendered by callers building their own help text.
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub condition: Vec<String>,
    #[serde(rename = "uniq", default)]
    pub unique: bool,
}

impl ParamDef {
    pub fn get_helps(&self) -> Vec<HelpEntry> {
        match self.param_type {
            ParamType::Selection => {
                let Some(range) = &self.range else {
                    return Vec::new();
                };
                let (sels, descs) = range.decode_selection();
                sels.into_iter()
                    .zip(descs)
                    .map(|(sel, desc)| {
                        let mut info = desc;
                        if !self.name_desc.desc.is_empty() {
                            info.push('(');
                            info.push_str(&self.name_desc.desc);
                            info.push(')');
                        }
                        HelpEntry {
                            what_to_input: sel,
                            info,
                        }
                    })
                    .collect()
            }
            ParamType::Plain => vec![HelpEntry {
                what_to_input: format!("<{}>", self.name_desc.name),
                info: self.name_desc.desc.clone(),
            }],
        }
    }

    /// Whether `value` is acceptable for this param. PLAIN accepts
    /// anything; SELECTION requires a case-insensitive, whitespace-trimmed
    /// exact match against one of the decoded selection names.
    pub fn check_value(&self, value: &str) -> bool {
        match self.param_type {
            ParamType::Plain => true,
            ParamType::Selection => {
                let Some(range) = &self.range else {
                    return false;
                };
                let (sels, _) = range.decode_selection();
                let value = value.trim().to_lowercase();
                sels.iter().any(|s| s.trim().to_lowercase() == value)
            }
        }
    }

    /// Completions for a partially-typed SELECTION value `src`; always
    /// empty for PLAIN. Each match is returned as the remaining suffix
    /// plus a trailing space, or a single space when `src` already equals
    /// the whole selection.
    pub fn get_completions(&self, src: &str) -> Vec<String> {
        if self.param_type != ParamType::Selection {
            return Vec::new();
        }
        let Some(range) = &self.range else {
            return Vec::new();
        };
        let (mut sels, _) = range.decode_selection();
        sels.sort();
        sels.dedup();

        let src_lower = src.to_lowercase();
        sels.into_iter()
            .filter(|s| s.to_lowercase().starts_with(&src_lower))
            .map(|s| {
                if s.len() == src.len() {
                    " ".to_string()
                } else {
                    format!("{} ", &s[src.len()..])
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommandDef {
    pub name: String,
    #[serde(default)]
    pub prefix: String,
    #[serde(rename = "param", default)]
    pub params: Vec<ParamDef>,
    #[serde(default)]
    pub comment: String,
    /// Indices into `params` with no `condition`, in declaration order.
    #[serde(skip)]
    pub static_params: Vec<usize>,
    /// Indices into `params` with at least one `condition`.
    #[serde(skip)]
    pub dynamic_params: Vec<usize>,
}

impl CommandDef {
    /// Partitions `params` into `static_params`/`dynamic_params` by
    /// whether they carry a condition. Called once after deserialization.
    pub fn partition_params(&mut self) {
        self.static_params.clear();
        self.dynamic_params.clear();
        for (idx, param) in self.params.iter().enumerate() {
            if param.condition.is_empty() {
                self.static_params.push(idx);
            } else {
                self.dynamic_params.push(idx);
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct SchemaTop {
    #[serde(default)]
    pub commands: Vec<CommandDef>,
}
