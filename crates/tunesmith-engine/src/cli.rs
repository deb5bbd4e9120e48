/// Sinks for the human-readable progress lines printed by every stage.
#[derive(Clone, Copy)]
pub struct OutputHandlers {
    pub out: fn(&str),
    pub err: fn(&str),
}

impl OutputHandlers {
    /// Progress on stdout, failures on stderr.
    pub fn console() -> Self {
        Self {
            out: |msg| println!("{}", msg),
            err: |msg| eprintln!("{}", msg),
        }
    }

    pub fn silent() -> Self {
        Self {
            out: |_| {},
            err: |_| {},
        }
    }
}
