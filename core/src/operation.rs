//! The built-in blog service operations.
//!
//! `service_operations!` expands one table into the `Operation` enum, its
//! descriptors, and one named method per operation on `Api`, so adding a row
//! adds a callable without any runtime lookup by reflection.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::api::Api;
use crate::catalog::{OperationDescriptor, ShapeHint};
use crate::error::ClientError;
use crate::http::HttpMethod;
use crate::progress::Progress;
use crate::result::ApiResult;
use crate::transport::Transport;

macro_rules! service_operations {
    ($($variant:ident, $method_name:ident => $name:literal, $method:ident, $url:literal, $shape:ident;)*) => {
        /// A named operation of the built-in catalog.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Operation {
            $($variant,)*
        }

        impl Operation {
            pub const ALL: &'static [Operation] = &[$(Operation::$variant,)*];

            /// Catalog key of the operation.
            pub fn name(self) -> &'static str {
                match self {
                    $(Operation::$variant => $name,)*
                }
            }

            pub fn descriptor(self) -> OperationDescriptor {
                match self {
                    $(Operation::$variant => OperationDescriptor::new(HttpMethod::$method, $url, ShapeHint::$shape),)*
                }
            }
        }

        impl<T: Transport> Api<T> {
            $(
                #[doc = concat!("Call `", $name, "` (`", $url, "`).")]
                pub fn $method_name(&self, body: &Value, progress: Progress<'_>) -> ApiResult {
                    self.call($name, body, progress)
                }
            )*
        }
    };
}

service_operations! {
    UserSignup, user_signup => "userSignup", Post, "/signup", BODY;
    UserLogin, user_login => "userLogin", Post, "/login", BODY;
    UploadFile, upload_file => "uploadFile", Post, "/file/upload", BODY;
    CreatePost, create_post => "createPost", Post, "/create", BODY;
    GetAllPosts, get_all_posts => "getAllPosts", Get, "/posts", PARAMS;
    GetPostById, get_post_by_id => "getPostById", Get, "post", QUERY;
    UpdatePost, update_post => "updatePost", Put, "update", QUERY;
    DeletePost, delete_post => "deletePost", Delete, "delete", QUERY;
    NewComment, new_comment => "newComment", Post, "/comment/new", BODY;
    GetAllComments, get_all_comments => "getAllComments", Get, "comments", QUERY;
    DeleteComment, delete_comment => "deleteComment", Delete, "comment/delete", QUERY;
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .iter()
            .copied()
            .find(|op| op.name() == s)
            .ok_or_else(|| ClientError::UnknownOperation(s.to_string()))
    }
}
