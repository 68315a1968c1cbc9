// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

pub mod config;
pub mod envelope;
pub mod error;
pub mod message;
pub mod notice;
pub mod state;

pub use config::*;
pub use envelope::*;
pub use error::*;
pub use message::*;
pub use notice::*;
pub use state::*;
