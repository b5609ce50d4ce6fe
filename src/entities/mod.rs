pub mod movie_credits;
pub mod movie_genres;
pub mod movies;
pub mod name_basics;
pub mod title_basics;
pub mod title_crew;
pub mod title_principals;
pub mod title_ratings;
