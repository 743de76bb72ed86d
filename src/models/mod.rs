pub mod book;
pub mod review;
pub mod user;

pub use book::{Author, BookDetail, BookListItem, BookRow, Genre, Page};
pub use review::{Comment, Rating};
pub use user::User;
