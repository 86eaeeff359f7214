// SPDX-License-Identifier: AGPL-3.0-or-later

mod deploy;
mod init;
mod publish;

pub use deploy::{deploy, DeployOptions};
pub use init::init;
pub use publish::{publish, PublishOptions};
