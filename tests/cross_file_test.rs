//! Tests for resolution across files and packages of a project without `go.mod`.

use gin_swag_from_source::analyzer::{AnalysisReport, Analyzer};
use gin_swag_from_source::config::AnalyzerConfig;
use gin_swag_from_source::loader;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

/// Helper function to create a temporary test project
fn create_test_project(files: Vec<(&str, &str)>) -> TempDir {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");

    for (path, content) in files {
        let file_path = temp_dir.path().join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(&file_path, content).expect("Failed to write test file");
    }

    temp_dir
}

const ROUTER: &str = r#"package router

import (
	"github.com/gin-gonic/gin"

	"shop/api/auth"
	"shop/api/order"
	"shop/api/user"
)

func InitRouter(e *gin.Engine) {
	api := e.Group("/api")
	v1 := api.Group("/v1")
	v1.DELETE("/user", user.Api.Delete)
	v1.GET("/user/profile", user.Api.Profile)
	initOrder(e.Group("/order"))
	e.POST("/login", auth.Group.Login)
}

func initOrder(g *gin.RouterGroup) {
	g.PATCH("/cancel", order.Cancel)
}
"#;

const USER: &str = r#"package user

import (
	"github.com/gin-gonic/gin"

	"shop/model"
)

var Api = new(userApi)

type base struct{}

type userApi struct {
	base
}

type ProfileReq struct {
	ID string
}

func (base) load(id string) (*model.User, error) {
	return nil, nil
}

// Delete 删除用户
func (a *userApi) Delete(c *gin.Context) {
	id := c.Param("id")
	u, _ := a.load(id)
	c.JSON(200, u)
}
"#;

const PROFILE: &str = r#"package user

import "github.com/gin-gonic/gin"

// Profile 用户资料
func (a *userApi) Profile(c *gin.Context) {
	var req ProfileReq
	c.ShouldBindQuery(&req)
	c.JSON(200, []ProfileReq{req})
}
"#;

const AUTH: &str = r#"package auth

import "github.com/gin-gonic/gin"

var Group = new(ApiGroup)

type ApiGroup struct {
	BaseApi
}

type BaseApi struct{}

// Login 登录
func (b *BaseApi) Login(c *gin.Context) {}
"#;

const ORDER: &str = r#"package order

import "github.com/gin-gonic/gin"

func Cancel(c *gin.Context) {
	c.String(200, "cancelled")
}
"#;

const MODEL: &str = r#"package model

type User struct {
	Name string
}
"#;

fn analyze_project() -> AnalysisReport {
    let temp_dir = create_test_project(vec![
        ("router/router.go", ROUTER),
        ("api/user/user.go", USER),
        ("api/user/profile.go", PROFILE),
        ("api/auth/auth.go", AUTH),
        ("api/order/order.go", ORDER),
        ("model/user.go", MODEL),
    ]);
    let config = AnalyzerConfig::default();
    let loaded = loader::load(temp_dir.path(), &config).expect("Failed to load project");
    assert!(loaded.layout.module.is_none());

    Analyzer::new(&config).analyze(&loaded.program, &loaded.types)
}

fn directives(report: &AnalysisReport, key: &str) -> Vec<String> {
    report
        .handlers()
        .find(|h| h.detail.key.to_string() == key)
        .unwrap_or_else(|| panic!("handler {} not found", key))
        .directives
        .clone()
}

#[test]
fn test_nested_groups_and_promoted_method_results() {
    let report = analyze_project();

    assert_eq!(
        directives(&report, "userApi.Delete"),
        vec![
            "@Summary Delete 删除用户",
            "@Accept application/json",
            "@Produce application/json",
            "@Success 200 {object} model.User \"成功\"",
            "@Router /api/v1/user [DELETE]",
        ]
    );
}

#[test]
fn test_types_from_sibling_file_of_same_package() {
    let report = analyze_project();

    assert_eq!(
        directives(&report, "userApi.Profile"),
        vec![
            "@Summary Profile 用户资料",
            "@Accept application/json",
            "@Produce application/json",
            "@Success 200 {object} []user.ProfileReq \"成功\"",
            "@Router /api/v1/user/profile [GET]",
            "@Param data query user.ProfileReq true \"请求参数\"",
        ]
    );
}

#[test]
fn test_router_parameter_starts_at_root() {
    // groups are tracked per function, so `initOrder` does not see the `/order` prefix
    let report = analyze_project();

    assert_eq!(
        directives(&report, "Cancel")[4],
        "@Router /cancel [PATCH]"
    );
}

#[test]
fn test_promoted_method_keys_by_declaring_type() {
    // `ApiGroup` embeds `BaseApi`, which declares `Login`
    let report = analyze_project();

    assert_eq!(
        directives(&report, "BaseApi.Login"),
        vec![
            "@Summary Login 登录",
            "@Accept application/json",
            "@Produce application/json",
            "@Router /login [POST]",
        ]
    );
}
