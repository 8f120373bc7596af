/*
 * Copyright © 2025, United States Government, as represented by the Administrator of
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License. You may obtain a copy
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

use std::fmt;

/// execute the provided `exit_func` upon receiving a ctrl-c (or SIGTERM) signal.
/// Note this does *not* automatically exit the process if not done so from `exit_func`.
/// This is meant for synchronous programs - async programs should await [`termination_signal`]
pub fn set_ctrlc_handler<F> (mut exit_func: F) -> Result<(),String>
    where F: FnMut()->() + Send + 'static
{
    ctrlc::set_handler( move || {
        exit_func();
    }).map_err( |e| e.to_string())
}

/// the signal that ended a [`termination_signal`] wait
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum TerminationSignal {
    Interrupt,
    Terminate,
}

impl fmt::Display for TerminationSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminationSignal::Interrupt => write!(f, "SIGINT"),
            TerminationSignal::Terminate => write!(f, "SIGTERM"),
        }
    }
}

/// wait for SIGINT (ctrl-c) or SIGTERM. On non-unix platforms only ctrl-c is observed
pub async fn termination_signal () -> std::io::Result<TerminationSignal> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal( SignalKind::terminate())?;

        tokio::select! {
            res = tokio::signal::ctrl_c() => { res.map( |_| TerminationSignal::Interrupt) }
            _ = sigterm.recv() => { Ok(TerminationSignal::Terminate) }
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await.map( |_| TerminationSignal::Interrupt)
    }
}

/// just an alias for std::process::exit()
#[inline] pub fn exit(exit_code: i32)-> ! { std::process::exit(exit_code) }
