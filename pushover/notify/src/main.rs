#![deny(
    missing_docs,
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications
)]

//! pushover-notify sends build outcomes from a CI pipeline to Pushover.
//!
//! If Pushover API token is "token" and user key is "user",
//!
//! ```
//! $ pushover-notify -t token -u user build --project app --result FAILURE --culprit alice
//! ```
//!
//! Or you can keep credentials in a properties file instead,
//!
//! ```
//! $ pushover-notify -t token -u user --save-properties send -m "hello"
//! $ pushover-notify send -m "Build failed" --priority high
//! ```
//!
//! For more information,
//!
//! ```
//! $ pushover-notify -h
//! ```

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::bail;
use clap::{Parser, Subcommand};
use log::{debug, Level};
use logging_timer::{finish, stimer};

use pushover_api::{
    BuildNotifier, BuildOutcome, BuildResult, Credentials, Message, Priority, Publisher,
    PushoverApi, Response, DEFAULT_PROPERTIES_FILE,
};

#[doc(hidden)]
#[derive(Parser)]
#[clap(about, author, version)]
struct Opts {
    /// Your application's API token. <https://pushover.net/api#identifiers>
    #[clap(short, long, env = "PUSHOVER_TOKEN")]
    token: Option<String>,
    /// The user / group key (not e-mail address) of your user (or you). <https://pushover.net/api#identifiers>
    #[clap(short, long, env = "PUSHOVER_USER")]
    user: Option<String>,
    /// Your user's device name to send the message directly to that device, rather than all of the user's devices. <https://pushover.net/api#identifiers>
    #[clap(long, env = "PUSHOVER_DEVICE")]
    device: Option<String>,
    /// Properties file holding apptoken, usertoken and device. Read when token or user is missing.
    #[clap(long, default_value = DEFAULT_PROPERTIES_FILE)]
    properties: PathBuf,
    /// Save credentials in use to the properties file.
    #[clap(long)]
    save_properties: bool,
    /// Proxy e.g. http://proxy.example.com:3128
    #[clap(long, env = "HTTPS_PROXY")]
    proxy: Option<String>,
    /// Verbose.
    #[clap(short, long)]
    verbose: bool,
    #[clap(subcommand)]
    command: Command,
}

#[doc(hidden)]
#[derive(Subcommand)]
enum Command {
    /// Send a message.
    Send {
        /// Your message. <https://pushover.net/api#messages>
        #[clap(short, long)]
        message: String,
        /// Your message's title, otherwise your app's name is used. <https://pushover.net/api#messages>
        #[clap(long)]
        title: Option<String>,
        /// A supplementary URL to show with your message. <https://pushover.net/api#urls>
        #[clap(long)]
        url: Option<String>,
        /// A title for your supplementary URL, otherwise just the URL is shown. <https://pushover.net/api#urls>
        #[clap(long)]
        url_title: Option<String>,
        /// e.g. -1, 0, 1, low, normal, high. Other numbers are clamped. <https://pushover.net/api#priority>
        #[clap(long, allow_hyphen_values = true)]
        priority: Option<String>,
    },
    /// Notify the outcome of a build. Successful builds are skipped unless --notify-on-success.
    Build {
        /// Project or job name.
        #[clap(short, long, env = "CI_PROJECT_NAME")]
        project: String,
        /// SUCCESS, UNSTABLE, FAILURE, NOT_BUILT or ABORTED.
        #[clap(short, long)]
        result: BuildResult,
        /// User whose changes possibly broke the build, may be repeated.
        #[clap(short, long)]
        culprit: Vec<String>,
        /// Notify successful builds as well.
        #[clap(long)]
        notify_on_success: bool,
    },
}

fn parse_priority(priority: &str) -> anyhow::Result<i32> {
    match Priority::from_str(priority) {
        Ok(p) => Ok(p.into()),
        Err(_) => match priority.parse::<i32>() {
            Ok(p) => Ok(p),
            Err(_) => bail!("invalid priority {priority}"),
        },
    }
}

/// Flags and environment variables win over the properties file,
/// which is only read when token or user is missing.
fn resolve_credentials(opts: &Opts) -> anyhow::Result<Credentials> {
    let mut loaded = Credentials::default();
    if opts.token.is_none() || opts.user.is_none() {
        debug!("load credentials from {:?}", opts.properties);
        if !loaded.load_from(&opts.properties) {
            bail!(
                "token and user are required, give them or a readable {:?}",
                opts.properties
            );
        }
    }
    let token = opts.token.clone().unwrap_or(loaded.app_token);
    let user = opts.user.clone().unwrap_or(loaded.user_token);
    let device = opts.device.clone().or(loaded.device).unwrap_or_default();
    Ok(Credentials::new(token, user)?.with_device(device))
}

#[doc(hidden)]
fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let opts: Opts = Opts::parse();

    let credentials = resolve_credentials(&opts)?;
    if opts.save_properties && credentials.save_to(&opts.properties) {
        debug!("credentials saved to {:?}", opts.properties);
    }

    let api = match opts.proxy {
        Some(ref proxy) => PushoverApi::with_proxy(credentials, proxy)?,
        None => PushoverApi::new(credentials),
    };

    let tmr = stimer!(Level::Debug; "NOTIFY");
    let body = match opts.command {
        Command::Send {
            ref message,
            ref title,
            ref url,
            ref url_title,
            ref priority,
        } => {
            let mut m = Message::new(message.as_str());
            m.title = title.as_deref();
            m.url = url.as_deref();
            m.url_title = url_title.as_deref();
            if let Some(p) = priority {
                m.priority = parse_priority(p)?;
            }
            api.send_message(&m)?
        }
        Command::Build {
            ref project,
            result,
            ref culprit,
            notify_on_success,
        } => {
            let outcome = BuildOutcome {
                project: project.clone(),
                result,
                culprits: culprit.clone(),
            };
            match BuildNotifier::new(&api, notify_on_success).perform(&outcome)? {
                Some(body) => body,
                None => {
                    debug!("{} {}, nothing to notify", outcome.project, outcome.result);
                    return Ok(());
                }
            }
        }
    };
    finish!(tmr);

    // rejections with HTTP 4xx already failed above, this catches a 200 without status 1
    let res = Response::parse(&body)?;
    if !res.is_success() {
        bail!(body);
    } else if opts.verbose {
        println!("{body}");
    }
    Ok(())
}
