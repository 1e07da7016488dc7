use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_accounts_tables::Migration),
            Box::new(m20240101_000002_create_core_tables::Migration),
            Box::new(m20240101_000003_create_finance_tables::Migration),
            Box::new(m20240101_000004_create_inventory_tables::Migration),
            Box::new(m20240101_000005_create_services_tables::Migration),
        ]
    }
}

fn index<T, C>(name: &str, table: T, col: C) -> IndexCreateStatement
where
    T: IntoIden + 'static,
    C: IntoIden + 'static,
{
    Index::create()
        .if_not_exists()
        .name(name)
        .table(table)
        .col(col)
        .to_owned()
}

fn fk<T, C, R, RC>(
    name: &str,
    table: T,
    col: C,
    ref_table: R,
    ref_col: RC,
    on_delete: ForeignKeyAction,
) -> ForeignKeyCreateStatement
where
    T: IntoIden + 'static,
    C: IntoIden + 'static,
    R: IntoIden + 'static,
    RC: IntoIden + 'static,
{
    ForeignKey::create()
        .name(name)
        .from(table, col)
        .to(ref_table, ref_col)
        .on_delete(on_delete)
        .on_update(ForeignKeyAction::Cascade)
        .to_owned()
}

mod m20240101_000001_create_accounts_tables {
    use super::{fk, index};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_accounts_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Users::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(Users::Username).string_len(150).not_null().unique_key())
                        .col(ColumnDef::new(Users::Email).string_len(254).not_null().unique_key())
                        .col(ColumnDef::new(Users::FirstName).string_len(150).not_null().default(""))
                        .col(ColumnDef::new(Users::LastName).string_len(150).not_null().default(""))
                        .col(ColumnDef::new(Users::Phone).string_len(17).not_null().default(""))
                        .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                        .col(ColumnDef::new(Users::IsActive).boolean().not_null().default(true))
                        .col(ColumnDef::new(Users::IsVerified).boolean().not_null().default(false))
                        .col(ColumnDef::new(Users::IsStaff).boolean().not_null().default(false))
                        .col(ColumnDef::new(Users::IsSuperuser).boolean().not_null().default(false))
                        .col(ColumnDef::new(Users::DateJoined).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(Users::LastLogin).timestamp_with_time_zone().null())
                        .col(ColumnDef::new(Users::LastLoginIp).string_len(45).null())
                        .col(ColumnDef::new(Users::CreatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(Users::UpdatedAt).timestamp_with_time_zone().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Profiles::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Profiles::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(Profiles::UserId).uuid().not_null().unique_key())
                        .col(ColumnDef::new(Profiles::Avatar).string().null())
                        .col(ColumnDef::new(Profiles::Gender).string_len(1).null())
                        .col(ColumnDef::new(Profiles::DateOfBirth).date().null())
                        .col(ColumnDef::new(Profiles::Bio).text().not_null().default(""))
                        .col(ColumnDef::new(Profiles::Address).text().not_null().default(""))
                        .col(ColumnDef::new(Profiles::City).string_len(100).not_null().default(""))
                        .col(ColumnDef::new(Profiles::Country).string_len(100).not_null().default("Iran"))
                        .col(ColumnDef::new(Profiles::PostalCode).string_len(20).not_null().default(""))
                        .col(ColumnDef::new(Profiles::EmergencyContactName).string_len(200).not_null().default(""))
                        .col(ColumnDef::new(Profiles::EmergencyContactPhone).string_len(17).not_null().default(""))
                        .col(ColumnDef::new(Profiles::CreatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(Profiles::UpdatedAt).timestamp_with_time_zone().not_null())
                        .foreign_key(&mut fk(
                            "fk_profiles_user_id",
                            Profiles::Table,
                            Profiles::UserId,
                            Users::Table,
                            Users::Id,
                            ForeignKeyAction::Cascade,
                        ))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Roles::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Roles::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(Roles::Name).string_len(100).not_null().unique_key())
                        .col(ColumnDef::new(Roles::Description).text().not_null().default(""))
                        .col(ColumnDef::new(Roles::IsActive).boolean().not_null().default(true))
                        .col(ColumnDef::new(Roles::CreatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(Roles::UpdatedAt).timestamp_with_time_zone().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(RolePermissions::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(RolePermissions::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(RolePermissions::RoleId).uuid().not_null())
                        .col(ColumnDef::new(RolePermissions::Permission).string_len(100).not_null())
                        .col(ColumnDef::new(RolePermissions::Granted).boolean().not_null().default(true))
                        .col(ColumnDef::new(RolePermissions::CreatedAt).timestamp_with_time_zone().not_null())
                        .foreign_key(&mut fk(
                            "fk_role_permissions_role_id",
                            RolePermissions::Table,
                            RolePermissions::RoleId,
                            Roles::Table,
                            Roles::Id,
                            ForeignKeyAction::Cascade,
                        ))
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("uq_role_permissions_role_permission")
                        .table(RolePermissions::Table)
                        .col(RolePermissions::RoleId)
                        .col(RolePermissions::Permission)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(UserRoles::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(UserRoles::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(UserRoles::UserId).uuid().not_null())
                        .col(ColumnDef::new(UserRoles::RoleId).uuid().not_null())
                        .col(ColumnDef::new(UserRoles::AssignedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(UserRoles::AssignedBy).uuid().null())
                        .col(ColumnDef::new(UserRoles::IsActive).boolean().not_null().default(true))
                        .foreign_key(&mut fk(
                            "fk_user_roles_user_id",
                            UserRoles::Table,
                            UserRoles::UserId,
                            Users::Table,
                            Users::Id,
                            ForeignKeyAction::Cascade,
                        ))
                        .foreign_key(&mut fk(
                            "fk_user_roles_role_id",
                            UserRoles::Table,
                            UserRoles::RoleId,
                            Roles::Table,
                            Roles::Id,
                            ForeignKeyAction::Cascade,
                        ))
                        .foreign_key(&mut fk(
                            "fk_user_roles_assigned_by",
                            UserRoles::Table,
                            UserRoles::AssignedBy,
                            Users::Table,
                            Users::Id,
                            ForeignKeyAction::SetNull,
                        ))
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("uq_user_roles_user_role")
                        .table(UserRoles::Table)
                        .col(UserRoles::UserId)
                        .col(UserRoles::RoleId)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(UserSessions::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(UserSessions::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(UserSessions::UserId).uuid().not_null())
                        .col(ColumnDef::new(UserSessions::SessionKey).string_len(40).not_null().unique_key())
                        .col(ColumnDef::new(UserSessions::IpAddress).string_len(45).not_null())
                        .col(ColumnDef::new(UserSessions::UserAgent).text().not_null().default(""))
                        .col(ColumnDef::new(UserSessions::CreatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(UserSessions::LastActivity).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(UserSessions::IsActive).boolean().not_null().default(true))
                        .foreign_key(&mut fk(
                            "fk_user_sessions_user_id",
                            UserSessions::Table,
                            UserSessions::UserId,
                            Users::Table,
                            Users::Id,
                            ForeignKeyAction::Cascade,
                        ))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(PasswordResetTokens::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(PasswordResetTokens::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(PasswordResetTokens::UserId).uuid().not_null())
                        .col(ColumnDef::new(PasswordResetTokens::Token).string_len(100).not_null().unique_key())
                        .col(ColumnDef::new(PasswordResetTokens::CreatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(PasswordResetTokens::ExpiresAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(PasswordResetTokens::IsUsed).boolean().not_null().default(false))
                        .col(ColumnDef::new(PasswordResetTokens::IpAddress).string_len(45).null())
                        .foreign_key(&mut fk(
                            "fk_password_reset_tokens_user_id",
                            PasswordResetTokens::Table,
                            PasswordResetTokens::UserId,
                            Users::Table,
                            Users::Id,
                            ForeignKeyAction::Cascade,
                        ))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(RefreshTokens::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(RefreshTokens::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(RefreshTokens::UserId).uuid().not_null())
                        .col(ColumnDef::new(RefreshTokens::TokenId).string_len(64).not_null().unique_key())
                        .col(ColumnDef::new(RefreshTokens::CreatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(RefreshTokens::ExpiresAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(RefreshTokens::Revoked).boolean().not_null().default(false))
                        .foreign_key(&mut fk(
                            "fk_refresh_tokens_user_id",
                            RefreshTokens::Table,
                            RefreshTokens::UserId,
                            Users::Table,
                            Users::Id,
                            ForeignKeyAction::Cascade,
                        ))
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(index("idx_user_sessions_user_id", UserSessions::Table, UserSessions::UserId))
                .await?;
            manager
                .create_index(index("idx_refresh_tokens_user_id", RefreshTokens::Table, RefreshTokens::UserId))
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            for table in [
                RefreshTokens::Table.into_iden(),
                PasswordResetTokens::Table.into_iden(),
                UserSessions::Table.into_iden(),
                UserRoles::Table.into_iden(),
                RolePermissions::Table.into_iden(),
                Roles::Table.into_iden(),
                Profiles::Table.into_iden(),
                Users::Table.into_iden(),
            ] {
                manager
                    .drop_table(Table::drop().table(table).if_exists().to_owned())
                    .await?;
            }
            Ok(())
        }
    }

    #[derive(DeriveIden)]
    enum Users {
        Table,
        Id,
        Username,
        Email,
        FirstName,
        LastName,
        Phone,
        PasswordHash,
        IsActive,
        IsVerified,
        IsStaff,
        IsSuperuser,
        DateJoined,
        LastLogin,
        LastLoginIp,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Profiles {
        Table,
        Id,
        UserId,
        Avatar,
        Gender,
        DateOfBirth,
        Bio,
        Address,
        City,
        Country,
        PostalCode,
        EmergencyContactName,
        EmergencyContactPhone,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Roles {
        Table,
        Id,
        Name,
        Description,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum RolePermissions {
        Table,
        Id,
        RoleId,
        Permission,
        Granted,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum UserRoles {
        Table,
        Id,
        UserId,
        RoleId,
        AssignedAt,
        AssignedBy,
        IsActive,
    }

    #[derive(DeriveIden)]
    enum UserSessions {
        Table,
        Id,
        UserId,
        SessionKey,
        IpAddress,
        UserAgent,
        CreatedAt,
        LastActivity,
        IsActive,
    }

    #[derive(DeriveIden)]
    enum PasswordResetTokens {
        Table,
        Id,
        UserId,
        Token,
        CreatedAt,
        ExpiresAt,
        IsUsed,
        IpAddress,
    }

    #[derive(DeriveIden)]
    enum RefreshTokens {
        Table,
        Id,
        UserId,
        TokenId,
        CreatedAt,
        ExpiresAt,
        Revoked,
    }
}

mod m20240101_000002_create_core_tables {
    use super::{fk, index};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_core_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Contacts::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Contacts::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(Contacts::FirstName).string_len(100).not_null())
                        .col(ColumnDef::new(Contacts::LastName).string_len(100).not_null())
                        .col(ColumnDef::new(Contacts::Email).string_len(254).not_null().unique_key())
                        .col(ColumnDef::new(Contacts::Phone).string_len(17).not_null().default(""))
                        .col(ColumnDef::new(Contacts::Mobile).string_len(17).not_null().default(""))
                        .col(ColumnDef::new(Contacts::ContactType).string_len(20).not_null().default("customer"))
                        .col(ColumnDef::new(Contacts::IsActive).boolean().not_null().default(true))
                        .col(ColumnDef::new(Contacts::Notes).text().not_null().default(""))
                        .col(ColumnDef::new(Contacts::CreatedBy).uuid().null())
                        .col(ColumnDef::new(Contacts::UpdatedBy).uuid().null())
                        .col(ColumnDef::new(Contacts::CreatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(Contacts::UpdatedAt).timestamp_with_time_zone().not_null())
                        .foreign_key(&mut fk(
                            "fk_contacts_created_by",
                            Contacts::Table,
                            Contacts::CreatedBy,
                            Users::Table,
                            Users::Id,
                            ForeignKeyAction::SetNull,
                        ))
                        .foreign_key(&mut fk(
                            "fk_contacts_updated_by",
                            Contacts::Table,
                            Contacts::UpdatedBy,
                            Users::Table,
                            Users::Id,
                            ForeignKeyAction::SetNull,
                        ))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Companies::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Companies::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(Companies::Name).string_len(200).not_null().unique_key())
                        .col(ColumnDef::new(Companies::LegalName).string_len(200).not_null().default(""))
                        .col(ColumnDef::new(Companies::CompanyType).string_len(20).not_null().default("customer"))
                        .col(ColumnDef::new(Companies::TaxId).string_len(50).null().unique_key())
                        .col(ColumnDef::new(Companies::RegistrationNumber).string_len(50).not_null().default(""))
                        .col(ColumnDef::new(Companies::Website).string().not_null().default(""))
                        .col(ColumnDef::new(Companies::Email).string_len(254).not_null().default(""))
                        .col(ColumnDef::new(Companies::Phone).string_len(17).not_null().default(""))
                        .col(ColumnDef::new(Companies::Fax).string_len(17).not_null().default(""))
                        .col(ColumnDef::new(Companies::IsActive).boolean().not_null().default(true))
                        .col(ColumnDef::new(Companies::Notes).text().not_null().default(""))
                        .col(ColumnDef::new(Companies::CreatedBy).uuid().null())
                        .col(ColumnDef::new(Companies::UpdatedBy).uuid().null())
                        .col(ColumnDef::new(Companies::CreatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(Companies::UpdatedAt).timestamp_with_time_zone().not_null())
                        .foreign_key(&mut fk(
                            "fk_companies_created_by",
                            Companies::Table,
                            Companies::CreatedBy,
                            Users::Table,
                            Users::Id,
                            ForeignKeyAction::SetNull,
                        ))
                        .foreign_key(&mut fk(
                            "fk_companies_updated_by",
                            Companies::Table,
                            Companies::UpdatedBy,
                            Users::Table,
                            Users::Id,
                            ForeignKeyAction::SetNull,
                        ))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Addresses::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Addresses::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(Addresses::ContactId).uuid().null())
                        .col(ColumnDef::new(Addresses::CompanyId).uuid().null())
                        .col(ColumnDef::new(Addresses::AddressType).string_len(20).not_null().default("office"))
                        .col(ColumnDef::new(Addresses::StreetAddress).text().not_null())
                        .col(ColumnDef::new(Addresses::City).string_len(100).not_null())
                        .col(ColumnDef::new(Addresses::State).string_len(100).not_null().default(""))
                        .col(ColumnDef::new(Addresses::PostalCode).string_len(20).not_null().default(""))
                        .col(ColumnDef::new(Addresses::Country).string_len(100).not_null().default("Iran"))
                        .col(ColumnDef::new(Addresses::IsPrimary).boolean().not_null().default(false))
                        .col(ColumnDef::new(Addresses::CreatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(Addresses::UpdatedAt).timestamp_with_time_zone().not_null())
                        .foreign_key(&mut fk(
                            "fk_addresses_contact_id",
                            Addresses::Table,
                            Addresses::ContactId,
                            Contacts::Table,
                            Contacts::Id,
                            ForeignKeyAction::Cascade,
                        ))
                        .foreign_key(&mut fk(
                            "fk_addresses_company_id",
                            Addresses::Table,
                            Addresses::CompanyId,
                            Companies::Table,
                            Companies::Id,
                            ForeignKeyAction::Cascade,
                        ))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(SystemConfigurations::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(SystemConfigurations::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(SystemConfigurations::Key).string_len(100).not_null().unique_key())
                        .col(ColumnDef::new(SystemConfigurations::Value).text().not_null())
                        .col(ColumnDef::new(SystemConfigurations::Description).text().not_null().default(""))
                        .col(ColumnDef::new(SystemConfigurations::IsActive).boolean().not_null().default(true))
                        .col(ColumnDef::new(SystemConfigurations::CreatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(SystemConfigurations::UpdatedAt).timestamp_with_time_zone().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(AuditLogs::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(AuditLogs::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(AuditLogs::UserId).uuid().null())
                        .col(ColumnDef::new(AuditLogs::Action).string_len(20).not_null())
                        .col(ColumnDef::new(AuditLogs::ModelName).string_len(100).not_null())
                        .col(ColumnDef::new(AuditLogs::ObjectId).string_len(100).not_null())
                        .col(ColumnDef::new(AuditLogs::ObjectRepr).string_len(200).not_null())
                        .col(ColumnDef::new(AuditLogs::Changes).json().null())
                        .col(ColumnDef::new(AuditLogs::IpAddress).string_len(45).null())
                        .col(ColumnDef::new(AuditLogs::UserAgent).text().not_null().default(""))
                        .col(ColumnDef::new(AuditLogs::CreatedAt).timestamp_with_time_zone().not_null())
                        .foreign_key(&mut fk(
                            "fk_audit_logs_user_id",
                            AuditLogs::Table,
                            AuditLogs::UserId,
                            Users::Table,
                            Users::Id,
                            ForeignKeyAction::SetNull,
                        ))
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(index("idx_contacts_contact_type", Contacts::Table, Contacts::ContactType))
                .await?;
            manager
                .create_index(index("idx_contacts_last_name", Contacts::Table, Contacts::LastName))
                .await?;
            manager
                .create_index(index("idx_companies_company_type", Companies::Table, Companies::CompanyType))
                .await?;
            manager
                .create_index(index("idx_addresses_contact_id", Addresses::Table, Addresses::ContactId))
                .await?;
            manager
                .create_index(index("idx_addresses_company_id", Addresses::Table, Addresses::CompanyId))
                .await?;
            manager
                .create_index(index("idx_audit_logs_model_name", AuditLogs::Table, AuditLogs::ModelName))
                .await?;
            manager
                .create_index(index("idx_audit_logs_created_at", AuditLogs::Table, AuditLogs::CreatedAt))
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            for table in [
                AuditLogs::Table.into_iden(),
                SystemConfigurations::Table.into_iden(),
                Addresses::Table.into_iden(),
                Companies::Table.into_iden(),
                Contacts::Table.into_iden(),
            ] {
                manager
                    .drop_table(Table::drop().table(table).if_exists().to_owned())
                    .await?;
            }
            Ok(())
        }
    }

    #[derive(DeriveIden)]
    enum Users {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum Contacts {
        Table,
        Id,
        FirstName,
        LastName,
        Email,
        Phone,
        Mobile,
        ContactType,
        IsActive,
        Notes,
        CreatedBy,
        UpdatedBy,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Companies {
        Table,
        Id,
        Name,
        LegalName,
        CompanyType,
        TaxId,
        RegistrationNumber,
        Website,
        Email,
        Phone,
        Fax,
        IsActive,
        Notes,
        CreatedBy,
        UpdatedBy,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Addresses {
        Table,
        Id,
        ContactId,
        CompanyId,
        AddressType,
        StreetAddress,
        City,
        State,
        PostalCode,
        Country,
        IsPrimary,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum SystemConfigurations {
        Table,
        Id,
        Key,
        Value,
        Description,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum AuditLogs {
        Table,
        Id,
        UserId,
        Action,
        ModelName,
        ObjectId,
        ObjectRepr,
        Changes,
        IpAddress,
        UserAgent,
        CreatedAt,
    }
}

mod m20240101_000003_create_finance_tables {
    use super::{fk, index};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_finance_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Accounts::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Accounts::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(Accounts::Name).string_len(200).not_null())
                        .col(ColumnDef::new(Accounts::Code).string_len(20).not_null().unique_key())
                        .col(ColumnDef::new(Accounts::AccountType).string_len(20).not_null())
                        .col(ColumnDef::new(Accounts::ParentId).uuid().null())
                        .col(ColumnDef::new(Accounts::Description).text().not_null().default(""))
                        .col(ColumnDef::new(Accounts::IsActive).boolean().not_null().default(true))
                        .col(ColumnDef::new(Accounts::CreatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(Accounts::UpdatedAt).timestamp_with_time_zone().not_null())
                        .foreign_key(&mut fk(
                            "fk_accounts_parent_id",
                            Accounts::Table,
                            Accounts::ParentId,
                            Accounts::Table,
                            Accounts::Id,
                            ForeignKeyAction::Restrict,
                        ))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Invoices::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Invoices::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(Invoices::InvoiceNumber).string_len(50).not_null().unique_key())
                        .col(ColumnDef::new(Invoices::InvoiceType).string_len(20).not_null().default("sale"))
                        .col(ColumnDef::new(Invoices::Status).string_len(20).not_null().default("draft"))
                        .col(ColumnDef::new(Invoices::CustomerId).uuid().not_null())
                        .col(ColumnDef::new(Invoices::CustomerCompanyId).uuid().null())
                        .col(ColumnDef::new(Invoices::InvoiceDate).date().not_null())
                        .col(ColumnDef::new(Invoices::DueDate).date().not_null())
                        .col(ColumnDef::new(Invoices::SentDate).timestamp_with_time_zone().null())
                        .col(ColumnDef::new(Invoices::PaidDate).timestamp_with_time_zone().null())
                        .col(ColumnDef::new(Invoices::Subtotal).decimal_len(12, 2).not_null().default(0))
                        .col(ColumnDef::new(Invoices::TaxRate).decimal_len(5, 2).not_null().default(0))
                        .col(ColumnDef::new(Invoices::TaxAmount).decimal_len(12, 2).not_null().default(0))
                        .col(ColumnDef::new(Invoices::DiscountAmount).decimal_len(12, 2).not_null().default(0))
                        .col(ColumnDef::new(Invoices::TotalAmount).decimal_len(12, 2).not_null().default(0))
                        .col(ColumnDef::new(Invoices::Notes).text().not_null().default(""))
                        .col(ColumnDef::new(Invoices::TermsAndConditions).text().not_null().default(""))
                        .col(ColumnDef::new(Invoices::CreatedBy).uuid().null())
                        .col(ColumnDef::new(Invoices::CreatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(Invoices::UpdatedAt).timestamp_with_time_zone().not_null())
                        .foreign_key(&mut fk(
                            "fk_invoices_customer_id",
                            Invoices::Table,
                            Invoices::CustomerId,
                            Contacts::Table,
                            Contacts::Id,
                            ForeignKeyAction::Restrict,
                        ))
                        .foreign_key(&mut fk(
                            "fk_invoices_customer_company_id",
                            Invoices::Table,
                            Invoices::CustomerCompanyId,
                            Companies::Table,
                            Companies::Id,
                            ForeignKeyAction::SetNull,
                        ))
                        .foreign_key(&mut fk(
                            "fk_invoices_created_by",
                            Invoices::Table,
                            Invoices::CreatedBy,
                            Users::Table,
                            Users::Id,
                            ForeignKeyAction::SetNull,
                        ))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(InvoiceItems::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(InvoiceItems::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(InvoiceItems::InvoiceId).uuid().not_null())
                        .col(ColumnDef::new(InvoiceItems::Description).string_len(500).not_null())
                        .col(ColumnDef::new(InvoiceItems::Quantity).decimal_len(10, 2).not_null().default(1))
                        .col(ColumnDef::new(InvoiceItems::UnitPrice).decimal_len(12, 2).not_null())
                        .col(ColumnDef::new(InvoiceItems::DiscountPercentage).decimal_len(5, 2).not_null().default(0))
                        .col(ColumnDef::new(InvoiceItems::LineTotal).decimal_len(12, 2).not_null().default(0))
                        .col(ColumnDef::new(InvoiceItems::CreatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(InvoiceItems::UpdatedAt).timestamp_with_time_zone().not_null())
                        .foreign_key(&mut fk(
                            "fk_invoice_items_invoice_id",
                            InvoiceItems::Table,
                            InvoiceItems::InvoiceId,
                            Invoices::Table,
                            Invoices::Id,
                            ForeignKeyAction::Cascade,
                        ))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Payments::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Payments::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(Payments::PaymentNumber).string_len(50).not_null().unique_key())
                        .col(ColumnDef::new(Payments::InvoiceId).uuid().not_null())
                        .col(ColumnDef::new(Payments::Amount).decimal_len(12, 2).not_null())
                        .col(ColumnDef::new(Payments::PaymentMethod).string_len(20).not_null())
                        .col(ColumnDef::new(Payments::Status).string_len(20).not_null().default("pending"))
                        .col(ColumnDef::new(Payments::PaymentDate).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(Payments::ReferenceNumber).string_len(100).not_null().default(""))
                        .col(ColumnDef::new(Payments::Notes).text().not_null().default(""))
                        .col(ColumnDef::new(Payments::BankName).string_len(100).not_null().default(""))
                        .col(ColumnDef::new(Payments::AccountNumber).string_len(50).not_null().default(""))
                        .col(ColumnDef::new(Payments::CreatedBy).uuid().null())
                        .col(ColumnDef::new(Payments::CreatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(Payments::UpdatedAt).timestamp_with_time_zone().not_null())
                        .foreign_key(&mut fk(
                            "fk_payments_invoice_id",
                            Payments::Table,
                            Payments::InvoiceId,
                            Invoices::Table,
                            Invoices::Id,
                            ForeignKeyAction::Cascade,
                        ))
                        .foreign_key(&mut fk(
                            "fk_payments_created_by",
                            Payments::Table,
                            Payments::CreatedBy,
                            Users::Table,
                            Users::Id,
                            ForeignKeyAction::SetNull,
                        ))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Transactions::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Transactions::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(Transactions::TransactionNumber).string_len(50).not_null().unique_key())
                        .col(ColumnDef::new(Transactions::Description).string_len(500).not_null())
                        .col(ColumnDef::new(Transactions::TransactionDate).date().not_null())
                        .col(ColumnDef::new(Transactions::Amount).decimal_len(12, 2).not_null())
                        .col(ColumnDef::new(Transactions::DebitAccountId).uuid().not_null())
                        .col(ColumnDef::new(Transactions::CreditAccountId).uuid().not_null())
                        .col(ColumnDef::new(Transactions::ReferenceType).string_len(50).not_null().default(""))
                        .col(ColumnDef::new(Transactions::ReferenceId).string_len(50).not_null().default(""))
                        .col(ColumnDef::new(Transactions::CreatedBy).uuid().null())
                        .col(ColumnDef::new(Transactions::CreatedAt).timestamp_with_time_zone().not_null())
                        .foreign_key(&mut fk(
                            "fk_transactions_debit_account_id",
                            Transactions::Table,
                            Transactions::DebitAccountId,
                            Accounts::Table,
                            Accounts::Id,
                            ForeignKeyAction::Restrict,
                        ))
                        .foreign_key(&mut fk(
                            "fk_transactions_credit_account_id",
                            Transactions::Table,
                            Transactions::CreditAccountId,
                            Accounts::Table,
                            Accounts::Id,
                            ForeignKeyAction::Restrict,
                        ))
                        .foreign_key(&mut fk(
                            "fk_transactions_created_by",
                            Transactions::Table,
                            Transactions::CreatedBy,
                            Users::Table,
                            Users::Id,
                            ForeignKeyAction::SetNull,
                        ))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Expenses::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Expenses::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(Expenses::ExpenseNumber).string_len(50).not_null().unique_key())
                        .col(ColumnDef::new(Expenses::Description).string_len(500).not_null())
                        .col(ColumnDef::new(Expenses::Category).string_len(20).not_null())
                        .col(ColumnDef::new(Expenses::Amount).decimal_len(12, 2).not_null())
                        .col(ColumnDef::new(Expenses::ExpenseDate).date().not_null())
                        .col(ColumnDef::new(Expenses::AccountId).uuid().not_null())
                        .col(ColumnDef::new(Expenses::VendorId).uuid().null())
                        .col(ColumnDef::new(Expenses::ReceiptNumber).string_len(100).not_null().default(""))
                        .col(ColumnDef::new(Expenses::ReceiptImage).string().null())
                        .col(ColumnDef::new(Expenses::IsApproved).boolean().not_null().default(false))
                        .col(ColumnDef::new(Expenses::ApprovedBy).uuid().null())
                        .col(ColumnDef::new(Expenses::ApprovedAt).timestamp_with_time_zone().null())
                        .col(ColumnDef::new(Expenses::CreatedBy).uuid().null())
                        .col(ColumnDef::new(Expenses::CreatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(Expenses::UpdatedAt).timestamp_with_time_zone().not_null())
                        .foreign_key(&mut fk(
                            "fk_expenses_account_id",
                            Expenses::Table,
                            Expenses::AccountId,
                            Accounts::Table,
                            Accounts::Id,
                            ForeignKeyAction::Restrict,
                        ))
                        .foreign_key(&mut fk(
                            "fk_expenses_vendor_id",
                            Expenses::Table,
                            Expenses::VendorId,
                            Contacts::Table,
                            Contacts::Id,
                            ForeignKeyAction::SetNull,
                        ))
                        .foreign_key(&mut fk(
                            "fk_expenses_approved_by",
                            Expenses::Table,
                            Expenses::ApprovedBy,
                            Users::Table,
                            Users::Id,
                            ForeignKeyAction::SetNull,
                        ))
                        .foreign_key(&mut fk(
                            "fk_expenses_created_by",
                            Expenses::Table,
                            Expenses::CreatedBy,
                            Users::Table,
                            Users::Id,
                            ForeignKeyAction::SetNull,
                        ))
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(index("idx_invoices_status", Invoices::Table, Invoices::Status))
                .await?;
            manager
                .create_index(index("idx_invoices_customer_id", Invoices::Table, Invoices::CustomerId))
                .await?;
            manager
                .create_index(index("idx_invoices_invoice_date", Invoices::Table, Invoices::InvoiceDate))
                .await?;
            manager
                .create_index(index("idx_invoice_items_invoice_id", InvoiceItems::Table, InvoiceItems::InvoiceId))
                .await?;
            manager
                .create_index(index("idx_payments_invoice_id", Payments::Table, Payments::InvoiceId))
                .await?;
            manager
                .create_index(index("idx_payments_status", Payments::Table, Payments::Status))
                .await?;
            manager
                .create_index(index(
                    "idx_transactions_debit_account_id",
                    Transactions::Table,
                    Transactions::DebitAccountId,
                ))
                .await?;
            manager
                .create_index(index(
                    "idx_transactions_credit_account_id",
                    Transactions::Table,
                    Transactions::CreditAccountId,
                ))
                .await?;
            manager
                .create_index(index("idx_expenses_account_id", Expenses::Table, Expenses::AccountId))
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            for table in [
                Expenses::Table.into_iden(),
                Transactions::Table.into_iden(),
                Payments::Table.into_iden(),
                InvoiceItems::Table.into_iden(),
                Invoices::Table.into_iden(),
                Accounts::Table.into_iden(),
            ] {
                manager
                    .drop_table(Table::drop().table(table).if_exists().to_owned())
                    .await?;
            }
            Ok(())
        }
    }

    #[derive(DeriveIden)]
    enum Users {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum Contacts {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum Companies {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum Accounts {
        Table,
        Id,
        Name,
        Code,
        AccountType,
        ParentId,
        Description,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Invoices {
        Table,
        Id,
        InvoiceNumber,
        InvoiceType,
        Status,
        CustomerId,
        CustomerCompanyId,
        InvoiceDate,
        DueDate,
        SentDate,
        PaidDate,
        Subtotal,
        TaxRate,
        TaxAmount,
        DiscountAmount,
        TotalAmount,
        Notes,
        TermsAndConditions,
        CreatedBy,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum InvoiceItems {
        Table,
        Id,
        InvoiceId,
        Description,
        Quantity,
        UnitPrice,
        DiscountPercentage,
        LineTotal,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Payments {
        Table,
        Id,
        PaymentNumber,
        InvoiceId,
        Amount,
        PaymentMethod,
        Status,
        PaymentDate,
        ReferenceNumber,
        Notes,
        BankName,
        AccountNumber,
        CreatedBy,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Transactions {
        Table,
        Id,
        TransactionNumber,
        Description,
        TransactionDate,
        Amount,
        DebitAccountId,
        CreditAccountId,
        ReferenceType,
        ReferenceId,
        CreatedBy,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum Expenses {
        Table,
        Id,
        ExpenseNumber,
        Description,
        Category,
        Amount,
        ExpenseDate,
        AccountId,
        VendorId,
        ReceiptNumber,
        ReceiptImage,
        IsApproved,
        ApprovedBy,
        ApprovedAt,
        CreatedBy,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000004_create_inventory_tables {
    use super::{fk, index};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_inventory_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Categories::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Categories::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(Categories::Name).string_len(100).not_null().unique_key())
                        .col(ColumnDef::new(Categories::Description).text().not_null().default(""))
                        .col(ColumnDef::new(Categories::ParentId).uuid().null())
                        .col(ColumnDef::new(Categories::IsActive).boolean().not_null().default(true))
                        .col(ColumnDef::new(Categories::CreatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(Categories::UpdatedAt).timestamp_with_time_zone().not_null())
                        .foreign_key(&mut fk(
                            "fk_categories_parent_id",
                            Categories::Table,
                            Categories::ParentId,
                            Categories::Table,
                            Categories::Id,
                            ForeignKeyAction::Cascade,
                        ))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Brands::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Brands::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(Brands::Name).string_len(100).not_null().unique_key())
                        .col(ColumnDef::new(Brands::Description).text().not_null().default(""))
                        .col(ColumnDef::new(Brands::Website).string().not_null().default(""))
                        .col(ColumnDef::new(Brands::Logo).string().null())
                        .col(ColumnDef::new(Brands::IsActive).boolean().not_null().default(true))
                        .col(ColumnDef::new(Brands::CreatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(Brands::UpdatedAt).timestamp_with_time_zone().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Suppliers::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Suppliers::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(Suppliers::Name).string_len(200).not_null())
                        .col(ColumnDef::new(Suppliers::ContactPerson).string_len(100).not_null().default(""))
                        .col(ColumnDef::new(Suppliers::Email).string_len(254).not_null().default(""))
                        .col(ColumnDef::new(Suppliers::Phone).string_len(17).not_null().default(""))
                        .col(ColumnDef::new(Suppliers::Address).text().not_null().default(""))
                        .col(ColumnDef::new(Suppliers::City).string_len(100).not_null().default(""))
                        .col(ColumnDef::new(Suppliers::Country).string_len(100).not_null().default("Iran"))
                        .col(ColumnDef::new(Suppliers::TaxId).string_len(50).not_null().default(""))
                        .col(ColumnDef::new(Suppliers::PaymentTerms).string_len(100).not_null().default(""))
                        .col(ColumnDef::new(Suppliers::IsActive).boolean().not_null().default(true))
                        .col(ColumnDef::new(Suppliers::CreatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(Suppliers::UpdatedAt).timestamp_with_time_zone().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Products::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Products::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(Products::Name).string_len(200).not_null())
                        .col(ColumnDef::new(Products::Sku).string_len(50).not_null().unique_key())
                        .col(ColumnDef::new(Products::Barcode).string_len(50).null().unique_key())
                        .col(ColumnDef::new(Products::Description).text().not_null().default(""))
                        .col(ColumnDef::new(Products::ShortDescription).string_len(500).not_null().default(""))
                        .col(ColumnDef::new(Products::CategoryId).uuid().not_null())
                        .col(ColumnDef::new(Products::BrandId).uuid().not_null())
                        .col(ColumnDef::new(Products::CostPrice).decimal_len(12, 2).not_null())
                        .col(ColumnDef::new(Products::SellingPrice).decimal_len(12, 2).not_null())
                        .col(ColumnDef::new(Products::UnitType).string_len(20).not_null().default("piece"))
                        .col(ColumnDef::new(Products::MinStockLevel).integer().not_null().default(0))
                        .col(ColumnDef::new(Products::MaxStockLevel).integer().not_null().default(1000))
                        .col(ColumnDef::new(Products::Weight).decimal_len(10, 3).null())
                        .col(ColumnDef::new(Products::Dimensions).string_len(100).not_null().default(""))
                        .col(ColumnDef::new(Products::Status).string_len(20).not_null().default("active"))
                        .col(ColumnDef::new(Products::IsTaxable).boolean().not_null().default(true))
                        .col(ColumnDef::new(Products::TaxRate).decimal_len(5, 2).not_null().default(0))
                        .col(ColumnDef::new(Products::Image).string().null())
                        .col(ColumnDef::new(Products::CreatedBy).uuid().null())
                        .col(ColumnDef::new(Products::CreatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(Products::UpdatedAt).timestamp_with_time_zone().not_null())
                        .foreign_key(&mut fk(
                            "fk_products_category_id",
                            Products::Table,
                            Products::CategoryId,
                            Categories::Table,
                            Categories::Id,
                            ForeignKeyAction::Restrict,
                        ))
                        .foreign_key(&mut fk(
                            "fk_products_brand_id",
                            Products::Table,
                            Products::BrandId,
                            Brands::Table,
                            Brands::Id,
                            ForeignKeyAction::Restrict,
                        ))
                        .foreign_key(&mut fk(
                            "fk_products_created_by",
                            Products::Table,
                            Products::CreatedBy,
                            Users::Table,
                            Users::Id,
                            ForeignKeyAction::SetNull,
                        ))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(InventoryItems::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(InventoryItems::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(InventoryItems::ProductId).uuid().not_null())
                        .col(ColumnDef::new(InventoryItems::Quantity).integer().not_null())
                        .col(ColumnDef::new(InventoryItems::TransactionType).string_len(20).not_null())
                        .col(ColumnDef::new(InventoryItems::ReferenceNumber).string_len(100).not_null().default(""))
                        .col(ColumnDef::new(InventoryItems::Notes).text().not_null().default(""))
                        .col(ColumnDef::new(InventoryItems::UnitCost).decimal_len(12, 2).null())
                        .col(ColumnDef::new(InventoryItems::CreatedBy).uuid().null())
                        .col(ColumnDef::new(InventoryItems::CreatedAt).timestamp_with_time_zone().not_null())
                        .foreign_key(&mut fk(
                            "fk_inventory_items_product_id",
                            InventoryItems::Table,
                            InventoryItems::ProductId,
                            Products::Table,
                            Products::Id,
                            ForeignKeyAction::Cascade,
                        ))
                        .foreign_key(&mut fk(
                            "fk_inventory_items_created_by",
                            InventoryItems::Table,
                            InventoryItems::CreatedBy,
                            Users::Table,
                            Users::Id,
                            ForeignKeyAction::SetNull,
                        ))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ProductImages::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(ProductImages::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(ProductImages::ProductId).uuid().not_null())
                        .col(ColumnDef::new(ProductImages::Image).string().not_null())
                        .col(ColumnDef::new(ProductImages::AltText).string_len(200).not_null().default(""))
                        .col(ColumnDef::new(ProductImages::IsPrimary).boolean().not_null().default(false))
                        .col(ColumnDef::new(ProductImages::SortOrder).integer().not_null().default(0))
                        .col(ColumnDef::new(ProductImages::CreatedAt).timestamp_with_time_zone().not_null())
                        .foreign_key(&mut fk(
                            "fk_product_images_product_id",
                            ProductImages::Table,
                            ProductImages::ProductId,
                            Products::Table,
                            Products::Id,
                            ForeignKeyAction::Cascade,
                        ))
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(index("idx_products_category_id", Products::Table, Products::CategoryId))
                .await?;
            manager
                .create_index(index("idx_products_brand_id", Products::Table, Products::BrandId))
                .await?;
            manager
                .create_index(index("idx_products_status", Products::Table, Products::Status))
                .await?;
            manager
                .create_index(index(
                    "idx_inventory_items_product_id",
                    InventoryItems::Table,
                    InventoryItems::ProductId,
                ))
                .await?;
            manager
                .create_index(index(
                    "idx_product_images_product_id",
                    ProductImages::Table,
                    ProductImages::ProductId,
                ))
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            for table in [
                ProductImages::Table.into_iden(),
                InventoryItems::Table.into_iden(),
                Products::Table.into_iden(),
                Suppliers::Table.into_iden(),
                Brands::Table.into_iden(),
                Categories::Table.into_iden(),
            ] {
                manager
                    .drop_table(Table::drop().table(table).if_exists().to_owned())
                    .await?;
            }
            Ok(())
        }
    }

    #[derive(DeriveIden)]
    enum Users {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum Categories {
        Table,
        Id,
        Name,
        Description,
        ParentId,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Brands {
        Table,
        Id,
        Name,
        Description,
        Website,
        Logo,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Suppliers {
        Table,
        Id,
        Name,
        ContactPerson,
        Email,
        Phone,
        Address,
        City,
        Country,
        TaxId,
        PaymentTerms,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Products {
        Table,
        Id,
        Name,
        Sku,
        Barcode,
        Description,
        ShortDescription,
        CategoryId,
        BrandId,
        CostPrice,
        SellingPrice,
        UnitType,
        MinStockLevel,
        MaxStockLevel,
        Weight,
        Dimensions,
        Status,
        IsTaxable,
        TaxRate,
        Image,
        CreatedBy,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum InventoryItems {
        Table,
        Id,
        ProductId,
        Quantity,
        TransactionType,
        ReferenceNumber,
        Notes,
        UnitCost,
        CreatedBy,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum ProductImages {
        Table,
        Id,
        ProductId,
        Image,
        AltText,
        IsPrimary,
        SortOrder,
        CreatedAt,
    }
}

mod m20240101_000005_create_services_tables {
    use super::{fk, index};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000005_create_services_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ServiceTypes::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(ServiceTypes::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(ServiceTypes::Name).string_len(100).not_null().unique_key())
                        .col(ColumnDef::new(ServiceTypes::Description).text().not_null().default(""))
                        .col(ColumnDef::new(ServiceTypes::BasePrice).decimal_len(12, 2).not_null())
                        .col(ColumnDef::new(ServiceTypes::EstimatedDurationMinutes).integer().not_null())
                        .col(ColumnDef::new(ServiceTypes::IsActive).boolean().not_null().default(true))
                        .col(ColumnDef::new(ServiceTypes::CreatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(ServiceTypes::UpdatedAt).timestamp_with_time_zone().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Technicians::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Technicians::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(Technicians::UserId).uuid().not_null().unique_key())
                        .col(ColumnDef::new(Technicians::EmployeeId).string_len(20).not_null().unique_key())
                        .col(ColumnDef::new(Technicians::SkillLevel).string_len(20).not_null().default("junior"))
                        .col(ColumnDef::new(Technicians::HourlyRate).decimal_len(10, 2).not_null())
                        .col(ColumnDef::new(Technicians::IsAvailable).boolean().not_null().default(true))
                        .col(ColumnDef::new(Technicians::MaxDailyHours).integer().not_null().default(8))
                        .col(ColumnDef::new(Technicians::CreatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(Technicians::UpdatedAt).timestamp_with_time_zone().not_null())
                        .foreign_key(&mut fk(
                            "fk_technicians_user_id",
                            Technicians::Table,
                            Technicians::UserId,
                            Users::Table,
                            Users::Id,
                            ForeignKeyAction::Cascade,
                        ))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(TechnicianSpecializations::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(TechnicianSpecializations::TechnicianId).uuid().not_null())
                        .col(ColumnDef::new(TechnicianSpecializations::ServiceTypeId).uuid().not_null())
                        .primary_key(
                            Index::create()
                                .col(TechnicianSpecializations::TechnicianId)
                                .col(TechnicianSpecializations::ServiceTypeId),
                        )
                        .foreign_key(&mut fk(
                            "fk_technician_specializations_technician_id",
                            TechnicianSpecializations::Table,
                            TechnicianSpecializations::TechnicianId,
                            Technicians::Table,
                            Technicians::Id,
                            ForeignKeyAction::Cascade,
                        ))
                        .foreign_key(&mut fk(
                            "fk_technician_specializations_service_type_id",
                            TechnicianSpecializations::Table,
                            TechnicianSpecializations::ServiceTypeId,
                            ServiceTypes::Table,
                            ServiceTypes::Id,
                            ForeignKeyAction::Cascade,
                        ))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ServiceRequests::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(ServiceRequests::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(ServiceRequests::RequestNumber).string_len(50).not_null().unique_key())
                        .col(ColumnDef::new(ServiceRequests::Title).string_len(200).not_null())
                        .col(ColumnDef::new(ServiceRequests::Description).text().not_null())
                        .col(ColumnDef::new(ServiceRequests::CustomerId).uuid().not_null())
                        .col(ColumnDef::new(ServiceRequests::CustomerCompanyId).uuid().null())
                        .col(ColumnDef::new(ServiceRequests::ServiceTypeId).uuid().not_null())
                        .col(ColumnDef::new(ServiceRequests::Priority).string_len(20).not_null().default("medium"))
                        .col(ColumnDef::new(ServiceRequests::Status).string_len(20).not_null().default("pending"))
                        .col(ColumnDef::new(ServiceRequests::AssignedTechnicianId).uuid().null())
                        .col(ColumnDef::new(ServiceRequests::AssignedAt).timestamp_with_time_zone().null())
                        .col(ColumnDef::new(ServiceRequests::AssignedBy).uuid().null())
                        .col(ColumnDef::new(ServiceRequests::RequestedDate).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(ServiceRequests::ScheduledDate).timestamp_with_time_zone().null())
                        .col(ColumnDef::new(ServiceRequests::StartedAt).timestamp_with_time_zone().null())
                        .col(ColumnDef::new(ServiceRequests::CompletedAt).timestamp_with_time_zone().null())
                        .col(ColumnDef::new(ServiceRequests::EstimatedCost).decimal_len(12, 2).null())
                        .col(ColumnDef::new(ServiceRequests::ActualCost).decimal_len(12, 2).null())
                        .col(ColumnDef::new(ServiceRequests::ServiceAddress).text().not_null().default(""))
                        .col(ColumnDef::new(ServiceRequests::ServiceCity).string_len(100).not_null().default(""))
                        .col(ColumnDef::new(ServiceRequests::CreatedBy).uuid().null())
                        .col(ColumnDef::new(ServiceRequests::CreatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(ServiceRequests::UpdatedAt).timestamp_with_time_zone().not_null())
                        .foreign_key(&mut fk(
                            "fk_service_requests_customer_id",
                            ServiceRequests::Table,
                            ServiceRequests::CustomerId,
                            Contacts::Table,
                            Contacts::Id,
                            ForeignKeyAction::Restrict,
                        ))
                        .foreign_key(&mut fk(
                            "fk_service_requests_customer_company_id",
                            ServiceRequests::Table,
                            ServiceRequests::CustomerCompanyId,
                            Companies::Table,
                            Companies::Id,
                            ForeignKeyAction::SetNull,
                        ))
                        .foreign_key(&mut fk(
                            "fk_service_requests_service_type_id",
                            ServiceRequests::Table,
                            ServiceRequests::ServiceTypeId,
                            ServiceTypes::Table,
                            ServiceTypes::Id,
                            ForeignKeyAction::Restrict,
                        ))
                        .foreign_key(&mut fk(
                            "fk_service_requests_assigned_technician_id",
                            ServiceRequests::Table,
                            ServiceRequests::AssignedTechnicianId,
                            Technicians::Table,
                            Technicians::Id,
                            ForeignKeyAction::SetNull,
                        ))
                        .foreign_key(&mut fk(
                            "fk_service_requests_assigned_by",
                            ServiceRequests::Table,
                            ServiceRequests::AssignedBy,
                            Users::Table,
                            Users::Id,
                            ForeignKeyAction::SetNull,
                        ))
                        .foreign_key(&mut fk(
                            "fk_service_requests_created_by",
                            ServiceRequests::Table,
                            ServiceRequests::CreatedBy,
                            Users::Table,
                            Users::Id,
                            ForeignKeyAction::SetNull,
                        ))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ServiceNotes::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(ServiceNotes::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(ServiceNotes::ServiceRequestId).uuid().not_null())
                        .col(ColumnDef::new(ServiceNotes::Note).text().not_null())
                        .col(ColumnDef::new(ServiceNotes::IsInternal).boolean().not_null().default(false))
                        .col(ColumnDef::new(ServiceNotes::CreatedBy).uuid().null())
                        .col(ColumnDef::new(ServiceNotes::CreatedAt).timestamp_with_time_zone().not_null())
                        .foreign_key(&mut fk(
                            "fk_service_notes_service_request_id",
                            ServiceNotes::Table,
                            ServiceNotes::ServiceRequestId,
                            ServiceRequests::Table,
                            ServiceRequests::Id,
                            ForeignKeyAction::Cascade,
                        ))
                        .foreign_key(&mut fk(
                            "fk_service_notes_created_by",
                            ServiceNotes::Table,
                            ServiceNotes::CreatedBy,
                            Users::Table,
                            Users::Id,
                            ForeignKeyAction::SetNull,
                        ))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Schedules::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Schedules::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(Schedules::TechnicianId).uuid().not_null())
                        .col(ColumnDef::new(Schedules::ServiceRequestId).uuid().not_null())
                        .col(ColumnDef::new(Schedules::StartTime).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(Schedules::EndTime).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(Schedules::Notes).text().not_null().default(""))
                        .col(ColumnDef::new(Schedules::IsConfirmed).boolean().not_null().default(false))
                        .col(ColumnDef::new(Schedules::CreatedBy).uuid().null())
                        .col(ColumnDef::new(Schedules::CreatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(Schedules::UpdatedAt).timestamp_with_time_zone().not_null())
                        .foreign_key(&mut fk(
                            "fk_schedules_technician_id",
                            Schedules::Table,
                            Schedules::TechnicianId,
                            Technicians::Table,
                            Technicians::Id,
                            ForeignKeyAction::Cascade,
                        ))
                        .foreign_key(&mut fk(
                            "fk_schedules_service_request_id",
                            Schedules::Table,
                            Schedules::ServiceRequestId,
                            ServiceRequests::Table,
                            ServiceRequests::Id,
                            ForeignKeyAction::Cascade,
                        ))
                        .foreign_key(&mut fk(
                            "fk_schedules_created_by",
                            Schedules::Table,
                            Schedules::CreatedBy,
                            Users::Table,
                            Users::Id,
                            ForeignKeyAction::SetNull,
                        ))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ServiceRatings::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(ServiceRatings::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(ServiceRatings::ServiceRequestId).uuid().not_null().unique_key())
                        .col(ColumnDef::new(ServiceRatings::Rating).integer().not_null())
                        .col(ColumnDef::new(ServiceRatings::Comment).text().not_null().default(""))
                        .col(ColumnDef::new(ServiceRatings::CreatedBy).uuid().null())
                        .col(ColumnDef::new(ServiceRatings::CreatedAt).timestamp_with_time_zone().not_null())
                        .foreign_key(&mut fk(
                            "fk_service_ratings_service_request_id",
                            ServiceRatings::Table,
                            ServiceRatings::ServiceRequestId,
                            ServiceRequests::Table,
                            ServiceRequests::Id,
                            ForeignKeyAction::Cascade,
                        ))
                        .foreign_key(&mut fk(
                            "fk_service_ratings_created_by",
                            ServiceRatings::Table,
                            ServiceRatings::CreatedBy,
                            Users::Table,
                            Users::Id,
                            ForeignKeyAction::SetNull,
                        ))
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(index("idx_service_requests_status", ServiceRequests::Table, ServiceRequests::Status))
                .await?;
            manager
                .create_index(index(
                    "idx_service_requests_assigned_technician_id",
                    ServiceRequests::Table,
                    ServiceRequests::AssignedTechnicianId,
                ))
                .await?;
            manager
                .create_index(index(
                    "idx_service_notes_service_request_id",
                    ServiceNotes::Table,
                    ServiceNotes::ServiceRequestId,
                ))
                .await?;
            manager
                .create_index(index("idx_schedules_technician_id", Schedules::Table, Schedules::TechnicianId))
                .await?;
            manager
                .create_index(index("idx_schedules_start_time", Schedules::Table, Schedules::StartTime))
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            for table in [
                ServiceRatings::Table.into_iden(),
                Schedules::Table.into_iden(),
                ServiceNotes::Table.into_iden(),
                ServiceRequests::Table.into_iden(),
                TechnicianSpecializations::Table.into_iden(),
                Technicians::Table.into_iden(),
                ServiceTypes::Table.into_iden(),
            ] {
                manager
                    .drop_table(Table::drop().table(table).if_exists().to_owned())
                    .await?;
            }
            Ok(())
        }
    }

    #[derive(DeriveIden)]
    enum Users {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum Contacts {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum Companies {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum ServiceTypes {
        Table,
        Id,
        Name,
        Description,
        BasePrice,
        EstimatedDurationMinutes,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Technicians {
        Table,
        Id,
        UserId,
        EmployeeId,
        SkillLevel,
        HourlyRate,
        IsAvailable,
        MaxDailyHours,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum TechnicianSpecializations {
        Table,
        TechnicianId,
        ServiceTypeId,
    }

    #[derive(DeriveIden)]
    enum ServiceRequests {
        Table,
        Id,
        RequestNumber,
        Title,
        Description,
        CustomerId,
        CustomerCompanyId,
        ServiceTypeId,
        Priority,
        Status,
        AssignedTechnicianId,
        AssignedAt,
        AssignedBy,
        RequestedDate,
        ScheduledDate,
        StartedAt,
        CompletedAt,
        EstimatedCost,
        ActualCost,
        ServiceAddress,
        ServiceCity,
        CreatedBy,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum ServiceNotes {
        Table,
        Id,
        ServiceRequestId,
        Note,
        IsInternal,
        CreatedBy,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum Schedules {
        Table,
        Id,
        TechnicianId,
        ServiceRequestId,
        StartTime,
        EndTime,
        Notes,
        IsConfirmed,
        CreatedBy,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum ServiceRatings {
        Table,
        Id,
        ServiceRequestId,
        Rating,
        Comment,
        CreatedBy,
        CreatedAt,
    }
}
