pub mod activity_feed;
