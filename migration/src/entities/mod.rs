pub mod campaign_link;
pub mod click_event;
pub mod conversion_event;
pub mod video_stat;
