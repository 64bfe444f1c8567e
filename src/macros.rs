//! macros used by tagcomplete

/// if an option is enabled, perform an expression
///
/// # Examples
///
/// ```no_run
/// use tagcomplete::opt_and;
///
/// fn announce() {
///     println!("logging is on");
/// }
///
/// opt_and!(logging.enable, announce());
/// ```
#[macro_export]
macro_rules! opt_and {
    ($field:ident, $a:expr) => {
        if $crate::getopt!($field) {
            $a
        }
    };

    ($lvl1:ident . $field:ident, $a:expr) => {
        if $crate::getopt!($lvl1.$field) {
            $a
        }
    };
}

/// helper macro for config validation
///
/// every listed field that's set has to satisfy its requirement, otherwise the message is
/// reported under the field's name
#[macro_export]
macro_rules! validator {
    ($struct_name:ty, $( $field:ident => $requirement:expr, $err_msg:expr );* $(;)? ) => {
        impl Validate for $struct_name {
            fn validate(&self) -> Result<(), Vec<String>> {
                let mut errors: Vec<String> = Vec::new();

                $(
                    if let Some(ref value) = self.$field
                        && !($requirement)(value)
                    {
                        errors.push(format!("{}: {}", stringify!($field), $err_msg));
                    }
                )*

                if errors.is_empty() {
                    Ok(())
                } else {
                    Err(errors)
                }
            }
        }
    };
}

/// get the current value of a given setting
///
/// falls back to the built-in default when the loaded config leaves it unset
#[macro_export]
macro_rules! getopt {
    () => {
        $crate::config::instance::config()
    };

    ($field:ident) => {{
        $crate::config::instance::get_or_default(
            |c| c.$field.clone(),
            $crate::config::options::TagcompleteCfg::default()
                .$field
                .expect(concat!("Default value missing for: ", stringify!($field))),
        )
    }};

    ($lvl1:ident . $field:ident) => {{
        $crate::config::instance::get_or_default(
            |c| c.$lvl1.as_ref().and_then(|sub| sub.$field.clone()),
            $crate::config::options::TagcompleteCfg::default()
                .$lvl1
                .and_then(|sub| sub.$field)
                .expect(concat!(
                    "Default value missing for: ",
                    stringify!($lvl1),
                    ".",
                    stringify!($field)
                )),
        )
    }};

    (raw $field:ident) => {{
        $crate::config::instance::config()
            .ok()
            .and_then(|c| c.$field.clone())
    }};

    (raw $lvl1:ident . $field:ident) => {{
        $crate::config::instance::config()
            .ok()
            .and_then(|c| c.$lvl1.as_ref().and_then(|sub| sub.$field.clone()))
    }};
}
