use sea_orm::{DeriveActiveEnum, EnumIter};

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(Some(1))")]
pub enum Visibility {
    #[sea_orm(string_value = "H")]
    Hide,
    #[sea_orm(string_value = "R")]
    HideResults,
    #[default]
    #[sea_orm(string_value = "S")]
    Show,
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(Some(1))")]
pub enum MatchType {
    #[default]
    #[sea_orm(string_value = "N")]
    Normal,
    #[sea_orm(string_value = "B")]
    Bye,
}
