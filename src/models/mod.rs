mod book;
mod goal_record;
mod settings;

pub use book::Book;
pub use goal_record::GoalRecord;
pub use settings::StreakSettings;
