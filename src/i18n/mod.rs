// SPDX-License-Identifier: MPL-2.0
//! Localization of shell feedback and error messages.
//!
//! Translations are Fluent `.ftl` bundles embedded at build time from
//! `assets/i18n/`. The locale comes from the `--lang` flag, then the
//! `[general] language` setting, then the operating system, and falls back to
//! `en-US`.

pub mod fluent;
