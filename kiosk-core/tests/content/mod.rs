// SPDX-FileCopyrightText: 2026 Kiosk Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Tests for the content store and digest pipeline.
