// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Record identifiers.
//!
//! Every persisted record is keyed by a UUID. Each table gets its own newtype
//! so a workspace id can never be handed to a client lookup by accident.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Wraps an existing UUID.
            #[inline]
            pub const fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Generates a fresh random identifier.
            #[inline]
            pub fn new_random() -> Self {
                Self(Uuid::new_v4())
            }

            /// Returns the inner UUID.
            #[inline]
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Parses an identifier, returning `None` for anything that is not a UUID.
            pub fn parse(s: &str) -> Option<Self> {
                Uuid::parse_str(s.trim()).ok().map(Self)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

record_id! {
    /// Identifier of a `users` row.
    UserId
}

record_id! {
    /// Identifier of a `workspaces` row.
    WorkspaceId
}

record_id! {
    /// Identifier of a `clients` row.
    ClientId
}

record_id! {
    /// Identifier of a `content_items` row.
    ContentId
}
