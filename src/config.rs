// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fs::read_to_string;
use std::path::Path;

use serde::Deserialize;

use crate::error::Fallible;
use crate::scheduler::EasePolicy;

pub const CONFIG_FILE_NAME: &str = "lexicards.toml";

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub ease_policy: EasePolicy,
    /// The most unseen cards a drill session introduces.
    pub new_cards_per_session: usize,
    /// How many days `stats` forecasts.
    pub upcoming_days: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ease_policy: EasePolicy::Uncapped,
            new_cards_per_session: 10,
            upcoming_days: 7,
        }
    }
}

impl Config {
    pub fn parse(content: &str) -> Fallible<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load the configuration file from a collection directory, falling back
    /// to the defaults when there is none.
    pub fn load(directory: &Path) -> Fallible<Self> {
        let path = directory.join(CONFIG_FILE_NAME);
        if path.exists() {
            log::debug!("Loading configuration from {}", path.display());
            Self::parse(&read_to_string(path)?)
        } else {
            Ok(Self::default())
        }
    }
}
