use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);
    };
}

id_newtype!(UserId);

/// The fixed catalogue of service kinds offered on the marketplace. The
/// server only accepts profile updates whose `service_type` is one of these;
/// frontends use the list to populate their selects.
pub const SERVICE_TYPES: [&str; 10] = [
    "репетитор",
    "бухгалтер",
    "программист",
    "дизайнер",
    "юрист",
    "фотограф",
    "маркетолог",
    "психолог",
    "переводчик",
    "сантехник",
];
