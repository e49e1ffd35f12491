//
//  gitlab-client
//  main.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use gitlab_client::api::common::{is_not_found, is_unauthorized, Error};
use gitlab_client::cli::Cli;
use gitlab_client::exit_codes;
use gitlab_client::output::{OutputFormat, OutputWriter};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_logging(cli.global.debug);

    let output = OutputWriter::new(OutputFormat::from_json_flag(cli.global.json));
    match cli.run().await {
        Ok(()) => std::process::exit(exit_codes::SUCCESS),
        Err(e) => {
            output.write_error(&format!("{e:#}"));
            std::process::exit(exit_code(&e));
        }
    }
}

/// `GL_DEBUG` wins; otherwise `--debug` selects debug level.
fn init_logging(debug: bool) {
    let filter = EnvFilter::try_from_env("GL_DEBUG")
        .unwrap_or_else(|_| EnvFilter::new(if debug { "gitlab_client=trace" } else { "warn" }));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn exit_code(err: &anyhow::Error) -> i32 {
    let auth_failure = err.chain().any(|e| {
        is_unauthorized(e)
            || matches!(
                e.downcast_ref::<Error>(),
                Some(Error::NoCredential | Error::Auth(_))
            )
    });
    if auth_failure {
        exit_codes::AUTH_ERROR
    } else if err.chain().any(|e| is_not_found(e)) {
        exit_codes::NOT_FOUND
    } else {
        exit_codes::ERROR
    }
}
