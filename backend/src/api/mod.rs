pub mod channel;
pub mod preferences;
pub mod search;
pub mod system;
pub mod video;

pub use channel::*;
pub use preferences::*;
pub use search::*;
pub use system::*;
pub use video::*;

use rocket::Route;

pub fn routes() -> Vec<Route> {
    routes![
        validate_api_key,
        clear_cache,
        search_keyword,
        search_channel,
        popular_videos,
        trending_videos,
        search_suggestions,
        analyze_channel,
        get_video,
        get_filters,
        put_filters,
        search_history,
        search_stats,
        list_favorites,
        add_favorite,
        remove_favorite,
    ]
}
