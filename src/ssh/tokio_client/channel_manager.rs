// Copyright 2025 Lablup Inc. and Jeongkyu Shin
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

//! SSH channel operations for interactive shells.

use russh::client::Msg;
use russh::Channel;

use super::connection::Client;

impl Client {
    /// Get a new SSH channel for communication.
    pub async fn get_channel(&self) -> Result<Channel<Msg>, super::Error> {
        self.connection_handle
            .channel_open_session()
            .await
            .map_err(super::Error::SshError)
    }

    /// Request an interactive shell channel with PTY support.
    ///
    /// This opens a session channel, requests a PTY of the given terminal type and
    /// dimensions, then starts the remote user's login shell on it.
    ///
    /// # Arguments
    /// * `term_type` - Terminal type (e.g., "xterm", "vt100")
    /// * `width` - Terminal width in columns
    /// * `height` - Terminal height in rows
    pub async fn request_interactive_shell(
        &self,
        term_type: &str,
        width: u32,
        height: u32,
    ) -> Result<Channel<Msg>, super::Error> {
        let channel = self.get_channel().await?;

        channel
            .request_pty(
                false,
                term_type,
                width,
                height,
                0,   // pixel width (0 means undefined)
                0,   // pixel height (0 means undefined)
                &[], // terminal modes (empty means use defaults)
            )
            .await?;

        channel.request_shell(false).await?;

        Ok(channel)
    }
}
