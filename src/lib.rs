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

//! A spaced repetition scheduler for vocabulary flashcards.
//!
//! The core is pure: [`scheduler::apply_rating`] computes a card's next state
//! from a rating and the current instant, and the functions in [`select`] and
//! [`stats`] build study queues and dashboards from a slice of cards. Nothing
//! in the core reads the clock or touches storage.
//!
//! The rest of the crate is a small command-line host around that core: a
//! SQLite card store with optimistic versioning, JSON import and export, and
//! a terminal drill.

pub mod cli;
pub mod cmd;
pub mod collection;
pub mod config;
pub mod db;
pub mod error;
pub mod import;
pub mod scheduler;
pub mod select;
pub mod session;
pub mod stats;
pub mod types;
