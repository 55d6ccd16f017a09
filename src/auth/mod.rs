pub mod claims;
pub mod clock;
pub mod gateway;

pub use claims::{Claims, TokenKind};
pub use clock::{Clock, ManualClock, SystemClock};
pub use gateway::{AuthError, AuthGateway, IssuedToken, TokenPair, TokenSettings};
