use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "reservation")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id_reservation: i32,

    pub id_user: i32,

    pub id_service: i32,

    /// RFC 3339 timestamp requested by the client.
    pub scheduled_datetime: String,

    pub payment_method: String,

    /// Copied from the service price at creation time.
    pub total_price: f64,

    /// See `constants::reservation_status`.
    pub id_status: i32,

    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user_account::Entity",
        from = "Column::IdUser",
        to = "super::user_account::Column::IdUser",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    UserAccount,
    #[sea_orm(
        belongs_to = "super::service::Entity",
        from = "Column::IdService",
        to = "super::service::Column::IdService",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Service,
}

impl Related<super::user_account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserAccount.def()
    }
}

impl Related<super::service::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Service.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
