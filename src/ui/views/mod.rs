pub mod breed_detail;
pub mod breed_list;
pub mod favourites;
pub mod votes;

pub use breed_detail::BreedDetailView;
pub use breed_list::BreedListView;
pub use favourites::FavouritesView;
pub use votes::VotesView;
