// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2025 William Bro-Jørgensen
// Copyright (c) 2020 Guillaume Fraux and contributors
//
// See LICENSE at the project root for full text.

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Atom {
    /// Canonical element symbol, see [`crate::element::normalize_symbol`]
    pub symbol: &'static str,
    pub position: [f64; 3],
}

impl Atom {
    pub fn new(symbol: &'static str, position: [f64; 3]) -> Self {
        Self { symbol, position }
    }
}
