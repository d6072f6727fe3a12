/// The two Fundgrube clearance endpoints polled on every run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    MediaMarkt,
    Saturn,
}

impl Endpoint {
    pub const ALL: [Endpoint; 2] = [Endpoint::MediaMarkt, Endpoint::Saturn];

    pub fn base_url(&self) -> &'static str {
        match self {
            Endpoint::MediaMarkt => "https://www.mediamarkt.de/de/data/fundgrube",
            Endpoint::Saturn => "https://www.saturn.de/de/data/fundgrube",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Endpoint::MediaMarkt => "mediamarkt",
            Endpoint::Saturn => "saturn",
        }
    }
}
