/// Implements [`ConnectionMethods`][crate::db::ConnectionMethods] for a
/// type by forwarding every call to the value returned from its
/// `wrapped_connection_methods` method.
#[macro_export]
macro_rules! connection_method_wrapper {
    ($ty:path) => {
        impl $crate::db::ConnectionMethods for $ty {
            fn execute(&self, sql: &str) -> $crate::Result<()> {
                $crate::db::ConnectionMethods::execute(self.wrapped_connection_methods()?, sql)
            }
            fn query(
                &self,
                table: &str,
                columns: &[$crate::db::Column],
                expr: Option<$crate::query::BoolExpr>,
                limit: Option<i32>,
                offset: Option<i32>,
                sort: Option<&[$crate::query::Order]>,
            ) -> $crate::Result<$crate::db::RawQueryResult> {
                $crate::db::ConnectionMethods::query(
                    self.wrapped_connection_methods()?,
                    table,
                    columns,
                    expr,
                    limit,
                    offset,
                    sort,
                )
            }
            fn insert_returning_pk(
                &self,
                table: &str,
                columns: &[$crate::db::Column],
                pkcol: &$crate::db::Column,
                values: &[$crate::SqlValRef<'_>],
            ) -> $crate::Result<$crate::SqlVal> {
                $crate::db::ConnectionMethods::insert_returning_pk(
                    self.wrapped_connection_methods()?,
                    table,
                    columns,
                    pkcol,
                    values,
                )
            }
            fn update(
                &self,
                table: &str,
                pkcol: $crate::db::Column,
                pk: $crate::SqlValRef<'_>,
                columns: &[$crate::db::Column],
                values: &[$crate::SqlValRef<'_>],
            ) -> $crate::Result<usize> {
                $crate::db::ConnectionMethods::update(
                    self.wrapped_connection_methods()?,
                    table,
                    pkcol,
                    pk,
                    columns,
                    values,
                )
            }
            fn delete_where(
                &self,
                table: &str,
                expr: $crate::query::BoolExpr,
            ) -> $crate::Result<usize> {
                $crate::db::ConnectionMethods::delete_where(
                    self.wrapped_connection_methods()?,
                    table,
                    expr,
                )
            }
            fn has_table(&self, table: &str) -> $crate::Result<bool> {
                $crate::db::ConnectionMethods::has_table(self.wrapped_connection_methods()?, table)
            }
        }
    };
}
