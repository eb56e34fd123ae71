pub mod certification;
pub mod education;
pub mod experience;
pub mod pagination;
pub mod project;
pub mod record;
pub mod resume;
pub mod section;
pub mod skill;
