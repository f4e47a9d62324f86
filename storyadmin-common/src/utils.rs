#[cfg(all(target_os = "linux", target_arch = "x86_64"))]
pub const USER_AGENT: &str = concat!(
    "storyadmin/",
    env!("CARGO_PKG_VERSION"),
    " (X11; Linux x86_64)"
);
#[cfg(all(target_os = "linux", not(target_arch = "x86_64")))]
pub const USER_AGENT: &str = concat!(
    "storyadmin/",
    env!("CARGO_PKG_VERSION"),
    " (X11; Linux i686)"
);

#[cfg(all(target_os = "windows", target_arch = "x86_64"))]
pub const USER_AGENT: &str = concat!(
    "storyadmin/",
    env!("CARGO_PKG_VERSION"),
    " (Windows NT 10.0; Win64; x64)"
);
#[cfg(all(target_os = "windows", not(target_arch = "x86_64")))]
pub const USER_AGENT: &str = concat!(
    "storyadmin/",
    env!("CARGO_PKG_VERSION"),
    " (Windows NT 10.0)"
);

#[cfg(not(any(target_os = "linux", target_os = "windows")))]
// Neither Linux nor Windows, so maybe OS X, and if not then OS X is an okay fallback.
pub const USER_AGENT: &str = concat!(
    "storyadmin/",
    env!("CARGO_PKG_VERSION"),
    " (Macintosh; Intel Mac OS X 10.15)"
);

/// Displays a number with `,` thousands separators.
pub struct Readable<N>
where
    N: std::fmt::Display,
{
    inner: N,
}

impl<N> std::fmt::Display for Readable<N>
where
    N: std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let digits = self.inner.to_string();
        let (sign, digits) = match digits.strip_prefix('-') {
            Some(rest) => ("-", rest),
            None => ("", digits.as_str()),
        };

        write!(f, "{}", sign)?;

        for (i, c) in digits.chars().enumerate() {
            if i != 0 && (digits.len() - i) % 3 == 0 {
                write!(f, ",")?;
            }

            write!(f, "{}", c)?;
        }

        Ok(())
    }
}

pub trait IntoReadable: std::fmt::Display + Sized {
    fn into_readable(self) -> Readable<Self> {
        Readable { inner: self }
    }
}

impl IntoReadable for usize {}
impl IntoReadable for u64 {}
impl IntoReadable for i64 {}
