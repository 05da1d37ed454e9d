use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind};
use std::path::Path;

use java_properties::PropertiesWriter;
use log::{debug, warn};

use crate::{is_blank, NotificationError};

/// Properties file used when no path is given.
pub const DEFAULT_PROPERTIES_FILE: &str = "pushover.properties";

const APP_TOKEN_KEY: &str = "apptoken";
const USER_TOKEN_KEY: &str = "usertoken";
const DEVICE_KEY: &str = "device";
const COMMENT: &str = "Pushover API Properties";

/// Application token, user key and optional device. <https://pushover.net/api#identifiers>
#[derive(Clone, Default, Eq, PartialEq)]
pub struct Credentials {
    /// Your application's API token.
    pub app_token: String,
    /// The user / group key (not e-mail address) of your user.
    pub user_token: String,
    /// Your user's device name to send the message directly to that device,
    /// rather than all of the user's devices.
    pub device: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("app_token", &"<redacted>")
            .field("user_token", &"<redacted>")
            .field("device", &self.device)
            .finish()
    }
}

impl Credentials {
    /// Creates [`Credentials`] for all devices of the user. Both tokens must not be blank.
    pub fn new<T>(app_token: T, user_token: T) -> Result<Self, NotificationError>
    where
        T: Into<String>,
    {
        let app_token = app_token.into();
        let user_token = user_token.into();
        if is_blank(&app_token) {
            return Err(NotificationError::BlankToken("token"));
        }
        if is_blank(&user_token) {
            return Err(NotificationError::BlankToken("user"));
        }
        Ok(Self {
            app_token,
            user_token,
            device: None,
        })
    }

    /// Targets a single device. A blank name targets all devices.
    pub fn with_device<T: Into<String>>(mut self, device: T) -> Self {
        let device = device.into();
        self.device = (!is_blank(&device)).then(|| device);
        self
    }

    /// Device name, unless blank.
    pub fn device(&self) -> Option<&str> {
        self.device.as_deref().filter(|d| !is_blank(d))
    }

    /// `token=<app>&user=<user>`, then `&device=<device>` if a device is set.
    pub fn authentication_tokens(&self) -> String {
        let mut tokens = format!("token={}&user={}", self.app_token, self.user_token);
        if let Some(device) = self.device() {
            tokens.push_str("&device=");
            tokens.push_str(device);
        }
        tokens
    }

    /// Saves to [`DEFAULT_PROPERTIES_FILE`] in the working directory.
    pub fn save(&self) -> bool {
        self.save_to(DEFAULT_PROPERTIES_FILE)
    }

    /// Saves as a Java properties file. Failures are logged and reported as `false`.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> bool {
        let path = path.as_ref();
        match self.write_properties(path) {
            Ok(_) => {
                debug!("saved properties file {path:?}");
                true
            }
            Err(e) => {
                warn!("unable to save properties file {path:?}: {e}");
                false
            }
        }
    }

    fn write_properties(&self, path: &Path) -> Result<(), NotificationError> {
        let file = File::create(path)?;
        let mut writer = PropertiesWriter::new(BufWriter::new(file));
        writer.write_comment(COMMENT)?;
        writer.write(APP_TOKEN_KEY, &self.app_token)?;
        writer.write(USER_TOKEN_KEY, &self.user_token)?;
        if let Some(device) = self.device() {
            writer.write(DEVICE_KEY, device)?;
        }
        writer.finish()?;
        Ok(())
    }

    /// Loads from [`DEFAULT_PROPERTIES_FILE`] in the working directory.
    pub fn load(&mut self) -> bool {
        self.load_from(DEFAULT_PROPERTIES_FILE)
    }

    /// Loads from a Java properties file, replacing all fields.
    /// Missing keys become empty. Failures are logged and reported as `false`,
    /// leaving the fields untouched.
    pub fn load_from<P: AsRef<Path>>(&mut self, path: P) -> bool {
        let path = path.as_ref();
        match read_properties(path) {
            Ok(mut props) => {
                self.app_token = props.remove(APP_TOKEN_KEY).unwrap_or_default();
                self.user_token = props.remove(USER_TOKEN_KEY).unwrap_or_default();
                self.device = props.remove(DEVICE_KEY).filter(|d| !is_blank(d));
                debug!("loaded properties file {path:?}");
                true
            }
            Err(NotificationError::Io(e)) if e.kind() == ErrorKind::NotFound => {
                warn!("properties file {path:?} not found");
                false
            }
            Err(e) => {
                warn!("error processing properties file {path:?}: {e}");
                false
            }
        }
    }
}

fn read_properties(path: &Path) -> Result<HashMap<String, String>, NotificationError> {
    let file = File::open(path)?;
    Ok(java_properties::read(BufReader::new(file))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("pushover-credentials-{}-{name}", std::process::id()))
    }

    #[test]
    fn t_new() {
        let c = Credentials::new("a", "u").unwrap();
        assert_eq!("a", c.app_token);
        assert_eq!("u", c.user_token);
        assert!(c.device.is_none());
    }

    #[test]
    fn t_new_blank() {
        assert!(matches!(
            Credentials::new("", "u"),
            Err(NotificationError::BlankToken("token"))
        ));
        assert!(matches!(
            Credentials::new("a", " \t"),
            Err(NotificationError::BlankToken("user"))
        ));
    }

    #[test]
    fn t_authentication_tokens() {
        let c = Credentials::new("a", "u").unwrap();
        assert_eq!("token=a&user=u", c.authentication_tokens());

        let c = c.with_device("phone");
        assert_eq!("token=a&user=u&device=phone", c.authentication_tokens());

        let c = c.with_device("  ");
        assert_eq!("token=a&user=u", c.authentication_tokens());

        let c = Credentials {
            device: Some(" ".to_string()),
            ..Credentials::new("a", "u").unwrap()
        };
        assert_eq!("token=a&user=u", c.authentication_tokens());
    }

    #[test]
    fn t_debug_hides_tokens() {
        let c = Credentials::new("secret-app", "secret-user")
            .unwrap()
            .with_device("phone");
        let debug = format!("{c:?}");
        assert!(debug.starts_with("Credentials"));
        assert!(debug.contains("phone"));
        assert!(!debug.contains("secret-app"));
        assert!(!debug.contains("secret-user"));
    }

    #[test]
    fn t_save_and_load() {
        let path = temp_path("roundtrip");
        let saved = Credentials::new("A1", "U1").unwrap().with_device("D1");
        assert!(saved.save_to(&path));

        let mut loaded = Credentials::default();
        assert!(loaded.load_from(&path));
        assert_eq!(saved, loaded);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn t_save_without_device() {
        let path = temp_path("nodevice");
        let saved = Credentials::new("A1", "U1").unwrap();
        assert!(saved.save_to(&path));

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("apptoken"));
        assert!(content.contains("usertoken"));
        assert!(!content.contains("device"));

        let mut loaded = Credentials::new("x", "y").unwrap().with_device("z");
        assert!(loaded.load_from(&path));
        assert_eq!(saved, loaded);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn t_load_not_validated() {
        let path = temp_path("partial");
        std::fs::write(&path, "# partial\nusertoken = U2\n").unwrap();

        let mut loaded = Credentials::new("x", "y").unwrap();
        assert!(loaded.load_from(&path));
        assert_eq!("", loaded.app_token);
        assert_eq!("U2", loaded.user_token);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn t_load_missing() {
        let mut c = Credentials::new("a", "u").unwrap();
        assert!(!c.load_from(temp_path("does-not-exist")));
        assert_eq!(Credentials::new("a", "u").unwrap(), c);
    }

    #[test]
    fn t_save_unwritable() {
        let path = temp_path("no-such-dir").join("pushover.properties");
        let c = Credentials::new("a", "u").unwrap();
        assert!(!c.save_to(path));
    }
}
