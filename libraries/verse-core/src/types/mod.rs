mod ids;
mod playlist;
mod track;
mod user;

pub use ids::{PlaylistId, TrackId, UserId};
pub use playlist::{Playlist, PlaylistRecord};
pub use track::{Track, TrackRecord};
pub use user::{AuthState, FederatedCredential, User, UserProfile};
