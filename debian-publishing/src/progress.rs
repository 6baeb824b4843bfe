// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Progress reporting contract.

Long publishes report progress through this optional, best-effort sink.
Implementations must tolerate being called from a blocking pipeline; the
engine never depends on progress calls succeeding.
*/

/// A console-style progress sink.
pub trait Progress {
    /// Print a line of status text.
    fn printf(&self, message: &str);

    /// Start a progress bar expecting `total` units of work.
    fn init_bar(&self, total: u64);

    /// Advance the current bar.
    fn add_bar(&self, delta: u64);

    /// Finish and erase the current bar.
    fn shutdown_bar(&self);

    /// Flush buffered output.
    ///
    /// Called before handing the console to an external process (such as a
    /// signer prompting for a passphrase).
    fn flush(&self);
}
