pub mod analyze_food_batch;
pub mod analyze_food_image;
pub mod detect_food_image;
