// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Miscellaneous things.

use std::{thread, time::Duration};

use console::Term;
use crossbeam_channel::{bounded, RecvTimeoutError};
use is_terminal::IsTerminal;

pub(crate) fn is_a_tty() -> bool {
    std::io::stdout().is_terminal() || std::io::stderr().is_terminal()
}

/// Run `func` on another thread. If it takes longer than a couple of seconds,
/// keep a line on the terminal saying that we're still waiting for it (e.g.
/// "Still reading catalog: 4.25s"), and clear that line once it's done.
pub(crate) fn expensive_op<F, R>(func: F, wait_message: &str) -> R
where
    F: FnOnce() -> R + Send,
    R: Send,
{
    const INITIAL_WAIT_TIME: Duration = Duration::from_secs(2);
    const INC_WAIT_TIME: Duration = Duration::from_millis(250);

    let (tx, rx) = bounded(1);

    thread::scope(|s| {
        let handle = s.spawn(move || {
            // If the receiver has gone, there's nobody to give the result to.
            let _ = tx.send(func());
        });

        // Only print messages if we're in an interactive terminal.
        let term = is_a_tty().then(Term::stderr);
        let mut total_wait_time = Duration::ZERO;
        let mut printed_wait_line = false;
        let clear_wait_line = |term: &Term| {
            // Failing to tidy up the terminal isn't worth stopping for.
            let _ = term.move_cursor_up(1);
            let _ = term.clear_line();
        };

        loop {
            match rx.recv_timeout(INC_WAIT_TIME) {
                Ok(r) => {
                    if let (Some(term), true) = (term.as_ref(), printed_wait_line) {
                        clear_wait_line(term);
                    }
                    return r;
                }

                Err(RecvTimeoutError::Timeout) => {
                    total_wait_time += INC_WAIT_TIME;
                    match term.as_ref() {
                        Some(term) if total_wait_time >= INITIAL_WAIT_TIME => {
                            if printed_wait_line {
                                clear_wait_line(term);
                            }
                            let _ = term.write_line(&format!(
                                "{wait_message}: {:.2}s",
                                total_wait_time.as_secs_f64()
                            ));
                            printed_wait_line = true;
                        }
                        _ => (),
                    }
                }

                // The sender only disconnects without sending if `func`
                // panicked; pass the panic on.
                Err(RecvTimeoutError::Disconnected) => match handle.join() {
                    Err(panic) => std::panic::resume_unwind(panic),
                    Ok(()) => unreachable!("the worker always sends before finishing"),
                },
            }
        }
    })
}
