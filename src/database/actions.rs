mod annotations;
mod ingredients;
mod recipes;
mod relations;
mod shopping_list;
mod short_links;
mod subscriptions;
mod tags;
mod users;

pub use annotations::*;
pub use ingredients::*;
pub use recipes::*;
pub use relations::*;
pub use shopping_list::*;
pub use short_links::*;
pub use subscriptions::*;
pub use tags::*;
pub use users::*;
