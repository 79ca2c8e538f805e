mod film_work;
mod genre;
mod genre_film_work;
mod person;
mod person_film_work;
mod raw_row;
mod record;

pub use film_work::{FilmWork, FilmWorkType, MAX_RATING, MIN_RATING};
pub use genre::Genre;
pub use genre_film_work::GenreFilmWork;
pub use person::Person;
pub use person_film_work::PersonFilmWork;
pub use raw_row::{RawRow, RawValue, parse_date, parse_timestamp};
pub use record::{ColumnValue, Record};
