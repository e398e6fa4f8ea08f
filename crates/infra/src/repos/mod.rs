pub mod friendships;
pub mod notifications;
pub mod registrations;
pub mod teams;
pub mod tournaments;
pub mod users;

pub use friendships::{FriendEntry, FriendshipRepo};
pub use notifications::NotificationRepo;
pub use registrations::{
    HistoryEntry, PlayerStats, RegistrationRepo, ResultEntry, RosterEntry,
};
pub use teams::{TeamRepo, TeamWithLeader};
pub use tournaments::{
    CreateTournament, TournamentFilter, TournamentRepo, UpdateTournament,
};
pub use users::{CreateUser, UpdateProfile, UserRepo};
