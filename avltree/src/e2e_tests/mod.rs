//! End-to-end tests at the command-session level.
//!
//! Each test file covers one scenario, feeding command lines to a
//! [`Session`](crate::session::Session) exactly as the shell does and
//! checking the printed output and the resulting tree.

#![cfg(test)]

mod helpers;

mod test_delete;
mod test_generate;
mod test_insert_find;
mod test_invalid_commands;
mod test_rekey_update;
mod test_rotation_scenario;
mod test_save_load;
